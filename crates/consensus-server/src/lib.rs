//!
//! Consensus Server - HTTP surface of the consensus engine
//!
//! Accepts submissions from the editor and serves the aggregated and raw
//! views a facilitator reads, plus the free-form diagram records.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

/// API module
pub mod api;

/// Server module
pub mod server;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

// Re-export key types
pub use config::{LogFormat, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::ConsensusServer;

use consensus_core::{FlowRepository, SubmissionRepository};
use consensus_state_inmemory::InMemoryStoreProvider;

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    // Initialize logging
    init_logging(&config);

    // Create dependencies
    let (submission_repo, flow_repo) = create_repositories(&config)?;

    // Create and run server
    ConsensusServer::new(config, submission_repo, flow_repo)
        .run()
        .await
}

/// Initialize logging.
///
/// `RUST_LOG` wins over the configured level. Calling this more than once
/// keeps the first subscriber.
pub fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // Create filter based on config
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = match config.log_format {
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

/// Create the stores named by the configured store URL
pub fn create_repositories(
    config: &ServerConfig,
) -> ServerResult<(Arc<dyn SubmissionRepository>, Arc<dyn FlowRepository>)> {
    if config.store_url.starts_with("memory://") {
        tracing::info!("Using in-memory submission store");
        Ok(InMemoryStoreProvider::new().create_repositories())
    } else {
        Err(ServerError::ConfigError(format!(
            "Unsupported store URL: {}",
            config.store_url
        )))
    }
}
