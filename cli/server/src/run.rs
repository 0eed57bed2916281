//! Main execution logic for the evflow CLI.

use anyhow::{Context, Result};
use ev_server::{Handler, Receiver, ServerConfig, TransformationConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::args::Cli;

/// Execute the server with the provided arguments.
pub async fn execute(args: Cli) -> Result<()> {
    let transformations = match &args.config {
        Some(path) => load_transformations(path)?,
        None => TransformationConfig::default(),
    };

    if transformations.is_empty() {
        info!("no transformations configured; events pass through unchanged");
    } else {
        info!(
            envelope_ops = transformations.envelope.len(),
            payload_ops = transformations.payload.len(),
            "transformation configuration loaded"
        );
    }

    let handler = Arc::new(Handler::new(&transformations)?);

    let mut config = ServerConfig::new()
        .with_listen_addr(&args.listen)
        .with_forward_timeout(Duration::from_secs(args.forward_timeout));
    if let Some(destination) = &args.destination {
        config = config.with_destination(destination);
    }
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    Receiver::new(handler, config)?.start().await?;
    Ok(())
}

/// Load and parse a transformation configuration file.
fn load_transformations(path: &Path) -> Result<TransformationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse configuration file {}", path.display()))
}
