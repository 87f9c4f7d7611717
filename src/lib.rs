pub mod error;
pub mod models;
pub mod modules;
pub mod proxy;
mod utils;

use std::sync::Arc;
use tracing::info;

use crate::proxy::credentials::{load_vms_credentials, VMS_KEYS_FILE};
use crate::proxy::server::AppState;
use crate::proxy::upstream::UpstreamClient;
use crate::proxy::AxumServer;

/// Service entry point: runs until Ctrl-C
pub async fn run() -> anyhow::Result<()> {
    let base_dir = modules::config::get_base_dir()?;

    // Initialize logger; the guard lives until run() returns
    let _log_guard = modules::logger::init_logger(&base_dir)?;
    info!("Service starting from: {}", base_dir.display());

    // 1. Load config
    let config = modules::config::load_app_config(&base_dir)?;

    // 2. Load VMS credentials once; a missing pair is reported on first use
    let credential = Arc::new(load_vms_credentials(&base_dir.join(VMS_KEYS_FILE)));
    if !credential.is_configured() {
        tracing::warn!(
            "VMS credentials not configured, operations will answer 503 until {} is provisioned and the service restarted",
            VMS_KEYS_FILE
        );
    }

    // 3. Wire upstream client and state
    let transport = Arc::new(UpstreamClient::new(&config.upstream)?);
    let state = AppState::from_config(&config, credential, transport);

    // 4. Start Axum server
    let (server, handle) = AxumServer::start(&config.server, &base_dir, state).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    server.stop();
    handle.await.ok();

    Ok(())
}
