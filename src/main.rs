//! Lead-intake server - main entry point.

use anyhow::Result;
use lead_intake_server::client::{AsyncCrmClient, AsyncCrmClientImpl};
use lead_intake_server::server::{run_server, AppState};
use lead_intake_server::{Config, LeadService, TokenCache, ZohoClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Starting lead-intake server against CRM at {}",
        config.crm_api_url
    );

    // Initialize the CRM client and token cache
    let sync_client = ZohoClient::new(&config);
    let client = Arc::new(AsyncCrmClientImpl::new(sync_client)) as Arc<dyn AsyncCrmClient>;
    let tokens = Arc::new(TokenCache::new(&config));

    let leads = Arc::new(LeadService::new(client, tokens, config.search_utc_offset));

    // Run the server (this will block until the process is stopped)
    run_server(AppState { leads }, config.listen_addr).await?;

    info!("Lead-intake server shutdown complete");
    Ok(())
}
