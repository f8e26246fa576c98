pub type SqlPool = sqlx::PgPool;
pub type PoolOptions = sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct State {
    pub config: Config,
    pub db_conn: SqlPool,
    pub mailer: Mailer,
}

pub type AppStateRaw = std::sync::Arc<State>;
pub type AppState = actix_web::web::Data<AppStateRaw>;
