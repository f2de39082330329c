use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::DbConfig;

pub fn connect_options(cfg: &DbConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .database(&cfg.name);
    match &cfg.password {
        Some(password) => options.password(password),
        None => options,
    }
}

/// Pool limits: `acquire_timeout` bounds both waiting for a free connection
/// and opening a new one.
pub fn pool_options(cfg: &DbConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .idle_timeout(cfg.idle_timeout)
        .acquire_timeout(cfg.connect_timeout)
}

/// Creates the pool without opening any connection; the first statement does.
pub fn connect_lazy(cfg: &DbConfig) -> PgPool {
    tracing::info!(
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.name,
        max_connections = cfg.max_connections,
        "database pool configured"
    );
    pool_options(cfg).connect_lazy_with(connect_options(cfg))
}
