//! Serve 命令

use std::path::PathBuf;

use anyhow::Result;
use omega_core::Config;
use omega_server::Gateway;

pub async fn run(host: Option<String>, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Omega search service...");
    tracing::info!("Configuration: {:?}", config.server);

    let gateway = Gateway::new(config);
    gateway.start().await?;

    Ok(())
}
