mod engine;

use std::fmt;

pub use engine::{fingerprint, SimulationEngine};

/// Where a request is in the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Decoding,
    DecodeFailed,
    Simulating,
    TransportFailed,
    Classifying,
    Analyzing,
    Complete,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Decoding => "decoding",
            PipelineStage::DecodeFailed => "decode-failed",
            PipelineStage::Simulating => "simulating",
            PipelineStage::TransportFailed => "transport-failed",
            PipelineStage::Classifying => "classifying",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::Complete => "complete",
        };
        f.write_str(name)
    }
}
