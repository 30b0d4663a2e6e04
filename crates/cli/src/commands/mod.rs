//! Command implementations.

pub mod catalog;
pub mod dispatch;

use lotdispatch_client::{ClientConfig, ClientError, ConfigError, WarehouseClient};
use lotdispatch_core::DispatchWarning;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Warehouse service call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Request rejected by cart or selection validation.
    #[error(transparent)]
    Warning(#[from] DispatchWarning),
}

/// Load configuration and build the warehouse client.
fn connect() -> Result<(ClientConfig, WarehouseClient), CommandError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");
    let client = WarehouseClient::new(&config)?;
    Ok((config, client))
}
