use timeline_engine::config::AppConfig;
use timeline_engine::run_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // RUST_LOG still overrides the Info default
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_env(Env::default())
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}, matrix window={} days",
        config.server.host,
        config.server.port,
        config.engine.matrix.time_window_days
    );

    run_server(config).await
}
