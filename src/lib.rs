pub mod api;
pub mod classifier;
pub mod config;
pub mod cpi;
pub mod decoder;
pub mod error;
pub mod narrative;
pub mod registry;
pub mod risk;
pub mod rpc;
pub mod service;
pub mod simulation;
pub mod stale;
pub mod types;

// Re-exports
pub use api::{create_router, ApiState};
pub use classifier::InstructionClassifier;
pub use config::{Config, Network};
pub use decoder::{DecodedTransaction, TransactionDecoder, WireFormat};
pub use error::{InstructionDecodeError, Result, SimLensError};
pub use registry::{ProgramInfo, ProgramRegistry};
pub use risk::RiskScorer;
pub use rpc::{RpcSimulationProvider, SimulationProvider};
pub use service::PreviewService;
pub use simulation::SimulationEngine;
pub use types::{
    CpiNode, DecodedInstruction, InstructionKind, OutcomeStatus, RiskAnalysis, RiskLevel,
    SimulationOutcome, Warning,
};
