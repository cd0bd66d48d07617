use motorlot::{
    api::{start_api_server, ApiState},
    init_observability,
    storage::create_pool,
    AppConfig, Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; config is read from the environment below.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::from_env()?;
    init_observability(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Motorlot account backend");
    info!(
        bind_address = %config.server.bind_address(),
        metrics_enabled = config.observability.enable_metrics,
        production = config.auth.production,
        "Loaded configuration from environment"
    );

    let pool = create_pool(&config.database).await?;
    let state = ApiState::new(pool, &config.auth);

    start_api_server(&config.server, state).await?;

    info!("Motorlot shutdown completed");
    Ok(())
}
