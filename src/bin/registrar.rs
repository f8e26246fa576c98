#[macro_use]
extern crate lazy_static;

use std::fs::File;
use std::io::{BufReader, Error, ErrorKind};

use actix_web::{error, middleware, web, App, HttpServer, Result};
use registrar_api::config::{Config, Opts, TlsConfig};
use registrar_api::handlers;
use registrar_api::middlewares::rate_limit::RateLimit;

lazy_static! {
    pub static ref CONFIG: Config = Config::parse_from_env();
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let (_handle, _opt) = Opts::parse_from_args();
    let config = &*CONFIG;
    let state = config.clone().into_state().await;
    let state2 = state.clone();
    let limiter = RateLimit::new();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(limiter.clone())
            .wrap(middleware::Logger::default())
            .default_service(web::route().to(not_found))
            .configure(handlers::student::init)
    })
    .workers(1)
    .keep_alive(std::time::Duration::from_secs(300))
    .bind(("0.0.0.0", state2.config.port))?;

    // The HTTPS listener serves the exact same routes off the same factory.
    if let Some(tls) = &state2.config.tls {
        let rustls_config = load_rustls_config(tls)?;
        server = server.bind_rustls_0_23(("0.0.0.0", tls.port), rustls_config)?;
    }

    server.run().await
}

async fn not_found() -> Result<&'static str> {
    Err(error::ErrorNotFound("route not found"))
}

fn load_rustls_config(tls: &TlsConfig) -> std::io::Result<rustls::ServerConfig> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(File::open(&tls.cert_file)?))
        .collect::<std::io::Result<Vec<_>>>()?;
    let key = rustls_pemfile::private_key(&mut BufReader::new(File::open(&tls.key_file)?))?
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "no private key in TLS key file"))?;

    rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("invalid TLS material: {}", e)))
}
