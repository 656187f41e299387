mod client;
mod provider;

#[cfg(test)]
pub(crate) mod mock;

pub use client::RpcSimulationProvider;
pub use provider::{render_transaction_error, ConfirmedTransaction, ExecutionReport, SimulationProvider};
