use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wealth_crm_core::{
    api::{start_server, ApiState},
    config::AppConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    info!("🚀 Wealth CRM Advisory Core - API Server");
    info!("📍 Port: {}", config.port);

    let projector = config.goal_projector();
    if projector.is_none() {
        warn!("⚠️  Goal thresholds not configured; /api/goals/review will answer 503");
        warn!("📌 Set GOAL_ANNUAL_GROWTH_RATE, GOAL_AT_RISK_GAP_PERCENT, GOAL_BEHIND_GAP_PERCENT and GOAL_AT_RISK_DAYS");
    }

    let state = ApiState::in_memory(projector);

    info!("✅ Services initialized");
    info!("📡 Starting API server...");

    start_server(state, config.port).await?;

    Ok(())
}
