use std::time::Duration;

use timetracker::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "timetracker=debug,axum=info,tower_http=info".to_string());
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

    let state = AppState::init().await?;
    let sweeper = state
        .sessions
        .spawn_sweeper(Duration::from_secs(state.config.session.sweep_seconds));

    let config = state.config.clone();
    let result = app::serve(app::build_app(state.clone()), &config).await;

    sweeper.abort();
    state.shutdown().await;
    result
}
