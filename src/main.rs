mod app;
mod config;
mod db;
mod error;
mod lifecycle;
mod state;
#[cfg(test)]
mod test_support;
mod users;
mod validation;

use crate::config::AppConfig;
use crate::lifecycle::Lifecycle;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "users_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr()?;
    let app_state = AppState::init(&config);
    let users = app_state.users.clone();

    let lifecycle = Lifecycle::new();
    lifecycle.watch_signals();

    app::serve(
        app::build_app(app_state),
        addr,
        users,
        lifecycle,
        config.shutdown_timeout,
    )
    .await?;

    Ok(())
}
