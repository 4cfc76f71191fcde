mod app;
mod config;
mod state;
mod users;

use crate::config::{AppConfig, AppEnv};

fn init_tracing(env: AppEnv) {
    let default_filter = match env {
        AppEnv::Local | AppEnv::Dev => "user_service=debug,axum=info,tower_http=info",
        AppEnv::Prod => "user_service=info,axum=info,tower_http=info",
    };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let json_logs = match std::env::var("LOG_FORMAT") {
        Ok(v) => v == "json",
        Err(_) => env != AppEnv::Local,
    };

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.env);
    tracing::info!(env = ?config.env, addr = %config.listen_addr(), "starting user service");

    let app_state = state::AppState::init(config).await?;

    // Schema is normally applied out of band; this only catches up a fresh database.
    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    let addr = app_state.config.listen_addr();
    app::serve(app::build_app(app_state), &addr).await
}
