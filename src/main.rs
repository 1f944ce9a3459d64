// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::catalog_service::CatalogService;
use crate::application::dashboard_service::DashboardService;
use crate::application::snapshot_service::SnapshotService;
use crate::application::usage_repository::UsageDataSource;
use crate::infrastructure::config::{load_server_config, DataSourceSettings};
use crate::infrastructure::memory_repository::InMemoryRepository;
use crate::infrastructure::remote_repository::RemoteRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_server_config()?;

    // Create data source (infrastructure layer)
    let repository: Arc<dyn UsageDataSource> = match &config.data_source {
        DataSourceSettings::Memory { fixture_path: Some(path) } => Arc::new(InMemoryRepository::load_fixture(path)?),
        DataSourceSettings::Memory { fixture_path: None } => Arc::new(InMemoryRepository::new()),
        DataSourceSettings::Remote { base_url, timeout_secs } => {
            tracing::info!("Using remote data source at {}", base_url);
            Arc::new(RemoteRepository::new(base_url.clone(), Duration::from_secs(*timeout_secs))?)
        }
    };

    // Create services (application layer)
    let snapshots = SnapshotService::new(repository);
    let dashboard_service = DashboardService::new(snapshots.clone(), &config.dashboard);
    let catalog_service = CatalogService::new(snapshots.clone());

    if config.dashboard.refresh_interval_secs > 0 {
        snapshots.spawn_refresh(Duration::from_secs(config.dashboard.refresh_interval_secs));
    }

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        catalog_service,
    });

    // Build router (presentation layer)
    let app = router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;
    tracing::info!("Starting model-usage-tracker on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
