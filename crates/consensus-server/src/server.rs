//! Main Consensus Server implementation
//!
//! This module contains the ConsensusServer implementation.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use consensus_core::{
    AggregationEngine, FlowRepository, FlowService, QueryService, SubmissionRepository,
    SubmissionService,
};

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Main server implementation
#[derive(Clone)]
pub struct ConsensusServer {
    /// Configuration
    pub config: ServerConfig,

    /// Read views over submissions
    query_service: Arc<QueryService>,

    /// Submission write path
    submission_service: Arc<SubmissionService>,

    /// Free-form diagram records
    flow_service: Arc<FlowService>,

    /// Server address (might be different from configured if port is 0)
    address: Option<SocketAddr>,
}

/// Manual Debug implementation that doesn't try to debug the trait objects
impl std::fmt::Debug for ConsensusServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusServer")
            .field("config", &self.config)
            .field("address", &self.address)
            .finish()
    }
}

impl ConsensusServer {
    /// Create a new ConsensusServer over the given stores
    pub fn new(
        config: ServerConfig,
        submission_repo: Arc<dyn SubmissionRepository>,
        flow_repo: Arc<dyn FlowRepository>,
    ) -> Self {
        let labels = config.label_set();
        let engine = AggregationEngine::new(config.aggregation_config());

        Self {
            query_service: Arc::new(QueryService::new(
                submission_repo.clone(),
                labels.clone(),
                engine,
            )),
            submission_service: Arc::new(SubmissionService::new(
                submission_repo,
                labels,
                config.strict_labels,
            )),
            flow_service: Arc::new(FlowService::new(flow_repo)),
            config,
            address: None,
        }
    }

    /// Query service
    pub fn query_service(&self) -> &QueryService {
        &self.query_service
    }

    /// Submission service
    pub fn submission_service(&self) -> &SubmissionService {
        &self.submission_service
    }

    /// Flow service
    pub fn flow_service(&self) -> &FlowService {
        &self.flow_service
    }

    /// Build the API router without binding a socket
    pub fn router(&self) -> Router {
        crate::api::build_router(Arc::new(self.clone()))
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(mut self) -> ServerResult<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Bind the configured address and record the address actually bound
    pub async fn bind(&mut self) -> ServerResult<TcpListener> {
        info!("Starting Consensus Server");

        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        self.address = Some(listener.local_addr()?);
        Ok(listener)
    }

    /// Serve requests on `listener` until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> ServerResult<()> {
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve requests on `listener` until `shutdown` resolves
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            expected_labels = self.config.expected_labels.len(),
            canvas_scale = self.config.canvas_scale,
            "Listening on {}",
            self.address()
        );

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }

    /// Bound address once [`bind`](Self::bind) has run, otherwise the configured one
    pub fn address(&self) -> SocketAddr {
        self.address
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], self.config.port)))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
