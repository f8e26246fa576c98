//! Per-IP fixed-window rate limiting.
//!
//! 100 requests per 15-minute window per peer address; over the limit the
//! request is answered with a 429 and a fixed text body without reaching the
//! handlers. The window store is shared across workers.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpResponse};
use futures::future::{ok, LocalBoxFuture, Ready};

const MAX_REQUESTS: usize = 100;
const WINDOW: Duration = Duration::from_secs(15 * 60);
const LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

#[derive(Debug)]
struct Window {
    started: Instant,
    count: usize,
}

#[derive(Clone)]
pub struct RateLimit {
    max: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimit {
    pub fn new() -> Self {
        Self::with_limit(MAX_REQUESTS, WINDOW)
    }

    pub fn with_limit(max: usize, window: Duration) -> Self {
        RateLimit {
            max,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request from `peer` and says whether it is still within
    /// the window's budget.
    fn check(&self, peer: IpAddr) -> bool {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        // Expired windows are dropped wholesale, so the map holds at most
        // one live entry per client address seen in the current window.
        windows.retain(|_, w| now.duration_since(w.started) < self.window);

        let window = windows.entry(peer).or_insert(Window {
            started: now,
            count: 0,
        });

        window.count += 1;
        window.count <= self.max
    }

    #[cfg(test)]
    fn tracked_peers(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitMiddleware {
            service,
            limiter: self.clone(),
        })
    }
}

pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Requests without a peer address (unix sockets, test harness
        // defaults) are not limited.
        let allowed = req
            .peer_addr()
            .map_or(true, |addr| self.limiter.check(addr.ip()));

        if !allowed {
            let (req, _) = req.into_parts();
            let res = HttpResponse::TooManyRequests()
                .body(LIMIT_MESSAGE)
                .map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, res)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::{web, App};

    #[test]
    fn counts_per_peer_within_the_window() {
        let limiter = RateLimit::with_limit(3, Duration::from_secs(60));
        let peer: IpAddr = "10.0.0.1".parse().unwrap();
        let other: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(peer));
        assert!(limiter.check(peer));
        assert!(limiter.check(peer));
        assert!(!limiter.check(peer));

        // A different peer has its own budget.
        assert!(limiter.check(other));
    }

    #[test]
    fn window_expiry_resets_the_budget() {
        let limiter = RateLimit::with_limit(1, Duration::from_millis(20));
        let peer: IpAddr = "10.0.0.3".parse().unwrap();

        assert!(limiter.check(peer));
        assert!(!limiter.check(peer));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check(peer));
    }

    #[test]
    fn expired_windows_are_evicted() {
        let limiter = RateLimit::with_limit(5, Duration::from_millis(20));
        let a: IpAddr = "10.0.0.4".parse().unwrap();
        let b: IpAddr = "10.0.0.5".parse().unwrap();

        assert!(limiter.check(a));
        assert!(limiter.check(b));
        assert_eq!(limiter.tracked_peers(), 2);

        std::thread::sleep(Duration::from_millis(30));

        // The next check sweeps both stale entries before tracking its own.
        assert!(limiter.check(a));
        assert_eq!(limiter.tracked_peers(), 1);
    }

    #[actix_rt::test]
    async fn over_limit_requests_get_429_with_fixed_text() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RateLimit::with_limit(2, Duration::from_secs(60)))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let peer = "10.1.1.1:4000".parse().unwrap();
        for _ in 0..2 {
            let req = actix_test::TestRequest::get().uri("/").peer_addr(peer).to_request();
            let res = actix_test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let req = actix_test::TestRequest::get().uri("/").peer_addr(peer).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, LIMIT_MESSAGE.as_bytes());
    }
}
