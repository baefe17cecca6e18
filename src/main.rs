use dotenvy::dotenv;
use hyperevm_gas_tracker::{
    background::{
        badge::Badge,
        scheduler::{self, SchedulerConfig},
        update_pipeline::UpdatePipeline,
    },
    config::AppConfig,
    routes::register_routes,
    state::AppState,
    storage::gas_store::GasStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

// Never log the config wholesale, RPC URLs may embed API keys.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let store = GasStore::open(&config.storage_path).await?;
    let badge = Badge::new();

    let mut pipeline = UpdatePipeline::from_config(&config, store.clone(), badge.clone())?;
    pipeline.initialize().await;
    let handle = pipeline.spawn();

    scheduler::start(handle.clone(), SchedulerConfig::from(&config));

    let app = register_routes(AppState::new(config.clone(), store, handle, badge));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.app_server_port)).await?;

    info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
