use log_classifier::config::Config;
use log_classifier::frontend::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (fails silently if not found)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt().with_target(false).init();

    info!("Starting Log Classification Frontend");

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    config.log_config();

    let addr = format!("0.0.0.0:{}", config.frontend_port);
    let app = router(AppState::new(config));

    info!("🚀 Log Classification Frontend listening on {}", addr);
    info!("");
    info!("📊 Endpoints:");
    info!("   GET  /              - Upload page");
    info!("   POST /upload        - Upload a CSV for classification");
    info!("   GET  /download/:id  - Download a classified CSV");
    info!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
