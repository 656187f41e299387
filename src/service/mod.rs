use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::registry::ProgramRegistry;
use crate::rpc::RpcSimulationProvider;
use crate::simulation::SimulationEngine;

/// Main preview service: one engine behind the REST API
pub struct PreviewService {
    config: Arc<Config>,
    engine: Arc<SimulationEngine<RpcSimulationProvider>>,
}

impl PreviewService {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(ProgramRegistry::with_entries(&config.registry.extra_programs)?);
        let provider = Arc::new(RpcSimulationProvider::from_config(&config));

        Ok(Self {
            engine: Arc::new(SimulationEngine::new(provider, registry)),
            config: Arc::new(config),
        })
    }

    /// Start the preview service
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("Starting SimLens preview service");
        info!("Network: {}", self.config.network.name());
        info!("RPC endpoint: {}", self.engine.provider().endpoint());
        info!("Registry: {} known programs", self.engine.registry().len());

        let router = create_router(ApiState {
            engine: self.engine(),
            network: self.config.network.name(),
        });

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.api.rest_port));
        let listener = TcpListener::bind(addr).await?;
        info!("REST API listening on {}", addr);

        axum::serve(listener, router).await?;
        Ok(())
    }

    pub fn engine(&self) -> Arc<SimulationEngine<RpcSimulationProvider>> {
        Arc::clone(&self.engine)
    }

    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}
