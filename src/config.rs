use crate::mailer::Mailer;
use crate::state::*;

use std::env;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_host: String,
    pub mail_port: u16,
    pub mail_user: String,
    pub mail_password: String,
    pub mail_from: String,
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    pub cert_file: String,
    pub key_file: String,
    pub port: u16,
}

/// How long to wait before re-attempting the initial database connection.
const CONNECT_RETRY: Duration = Duration::from_secs(5);

impl Config {
    pub fn parse_from_env() -> Self {
        // Load environment variables from a .env file. This is used for dev workflows.
        dotenv::dotenv().ok();

        let mut env_vars: std::collections::HashMap<String, String> = env::vars().collect();

        // Note: it's okay to panic in places like this, because without these
        // env vars, we can't launch the server at all, and it only happens at startup.

        // Build the database URL from the various environment variables.
        let database_user = env_vars
            .remove("POSTGRES_USER")
            .expect("no database user environment variable present");
        let database_password = env_vars
            .remove("POSTGRES_PASSWORD")
            .expect("no database password environment variable present");
        let database_host = env_vars
            .remove("POSTGRES_HOST")
            .expect("no database host environment variable present");
        let database_port = env_vars
            .remove("POSTGRES_PORT")
            .expect("no database port environment variable present");
        let database_name = env_vars
            .remove("POSTGRES_DB")
            .expect("no database name environment variable present");
        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            database_user, database_password, database_host, database_port, database_name
        );

        let port = env_vars
            .remove("PORT")
            .expect("no port environment variable present")
            .parse::<u16>()
            .expect("invalid port");

        let mail_host = env_vars
            .remove("MAIL_HOST")
            .expect("no mail host environment variable present");
        let mail_port = env_vars
            .remove("MAIL_PORT")
            .expect("no mail port environment variable present")
            .parse::<u16>()
            .expect("invalid mail port");
        // An empty mail user means the relay accepts unauthenticated mail
        // (local dev SMTP servers).
        let mail_user = env_vars.remove("MAIL_USER").unwrap_or_default();
        let mail_password = env_vars.remove("MAIL_PASSWORD").unwrap_or_default();
        let mail_from = env_vars
            .remove("MAIL_FROM")
            .expect("no mail from-address environment variable present");

        // The HTTPS listener is optional: it only exists when both TLS paths
        // are configured, and serves the same routes as the plain listener.
        let tls = match (env_vars.remove("TLS_CERT_FILE"), env_vars.remove("TLS_KEY_FILE")) {
            (Some(cert_file), Some(key_file)) => {
                let https_port = env_vars
                    .remove("HTTPS_PORT")
                    .expect("no https port environment variable present")
                    .parse::<u16>()
                    .expect("invalid https port");
                Some(TlsConfig {
                    cert_file,
                    key_file,
                    port: https_port,
                })
            }
            (None, None) => None,
            _ => panic!("TLS_CERT_FILE and TLS_KEY_FILE must be set together"),
        };

        Config {
            database_url,
            port,
            mail_host,
            mail_port,
            mail_user,
            mail_password,
            mail_from,
            tls,
        }
    }

    pub async fn into_state(self) -> AppStateRaw {
        info!("config: {:?}", self);

        // A single connection is the whole pool: every request serializes on
        // this one handle.
        let db_conn = loop {
            match PoolOptions::new()
                .max_connections(1)
                .connect(&self.database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    error!(
                        "database unreachable, retrying in {}s: {}",
                        CONNECT_RETRY.as_secs(),
                        e
                    );
                    tokio::time::sleep(CONNECT_RETRY).await;
                }
            }
        };

        let mailer = Mailer::from_config(&self).expect("invalid mail relay configuration");

        Arc::new(State {
            config: self,
            db_conn,
            mailer,
        })
    }
}

#[derive(clap::Parser, Debug)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Opts {
    // The number of occurrences of the `v/verbose` flag
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

impl Opts {
    pub fn parse_from_args() -> (JoinHandle, Self) {
        use clap::Parser;
        let opt: Self = Opts::parse();

        let level = match opt.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _more => LevelFilter::Trace,
        };

        let formater = BaseFormater::new()
            .local(true)
            .color(true)
            .level(4)
            .formater(format);
        let filter = BaseFilter::new()
            .starts_with(true)
            .notfound(true)
            .max_level(level)
            .chain(
                "sqlx",
                if opt.verbose > 1 {
                    LevelFilter::Debug
                } else {
                    LevelFilter::Warn
                },
            );

        let handle = NonblockLogger::new()
            .filter(filter)
            .unwrap()
            .formater(formater)
            .log_to_stdout()
            .map_err(|e| eprintln!("failed to init nonblock_logger: {:?}", e))
            .unwrap();

        info!("opt: {:?}", opt);

        (handle, opt)
    }
}

use nonblock_logger::{
    log::{LevelFilter, Record},
    BaseFilter, BaseFormater, FixedLevel, JoinHandle, NonblockLogger,
};

pub fn format(base: &BaseFormater, record: &Record) -> String {
    let level = FixedLevel::with_color(record.level(), base.color_get())
        .length(base.level_get())
        .into_colored()
        .into_coloredfg();

    format!(
        "[{} {}#{}:{} {}] {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        level,
        record.module_path().unwrap_or("*"),
        record.line().unwrap_or(0),
        nonblock_logger::current_thread_name(),
        record.args()
    )
}
