pub mod instruction;
pub mod outcome;
pub mod risk;

// Re-export commonly used types
pub use instruction::{CpiNode, DecodedInstruction, InstructionKind, RawInstruction};
pub use outcome::{AccountChange, AccountSnapshot, OutcomeStatus, SimulationOutcome, Warning, WarningKind};
pub use risk::{Heuristic, RiskAnalysis, RiskFactor, RiskLevel, Severity};
