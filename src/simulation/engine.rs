use chrono::Utc;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classifier::InstructionClassifier;
use crate::cpi::build_cpi_tree;
use crate::decoder::{decode_base64, DecodedTransaction, TransactionDecoder};
use crate::error::{Result, SimLensError};
use crate::narrative;
use crate::registry::ProgramRegistry;
use crate::risk::RiskScorer;
use crate::rpc::{ExecutionReport, SimulationProvider};
use crate::stale;
use crate::types::{AccountChange, AccountSnapshot, CpiNode, RiskAnalysis, SimulationOutcome};

use super::PipelineStage;

/// Main analysis engine - orchestrates decode, simulation and analysis
pub struct SimulationEngine<P> {
    provider: Arc<P>,
    registry: Arc<ProgramRegistry>,
    classifier: InstructionClassifier,
    risk_scorer: RiskScorer,
}

impl<P: SimulationProvider> SimulationEngine<P> {
    pub fn new(provider: Arc<P>, registry: Arc<ProgramRegistry>) -> Self {
        Self {
            classifier: InstructionClassifier::new(Arc::clone(&registry)),
            risk_scorer: RiskScorer::new(Arc::clone(&registry)),
            provider,
            registry,
        }
    }

    pub fn provider(&self) -> Arc<P> {
        Arc::clone(&self.provider)
    }

    pub fn registry(&self) -> Arc<ProgramRegistry> {
        Arc::clone(&self.registry)
    }

    /// Preview an unsigned transaction.
    ///
    /// Pipeline:
    /// 1. Decode base64 wire bytes and resolve lookup-table addresses
    /// 2. Simulate against current chain state
    /// 3. Classify the result and run the analysis stages
    pub async fn analyze_base64(&self, input: &str) -> Result<SimulationOutcome> {
        info!("[{}] {} base64 chars", PipelineStage::Decoding, input.len());

        // Step 1: Decode
        let bytes = decode_base64(input).map_err(|e| self.decode_failed(e))?;
        let decoded = TransactionDecoder::new(self.provider.as_ref())
            .decode_bytes(&bytes)
            .await
            .map_err(|e| self.decode_failed(e))?;

        // Step 2: Simulate
        info!(
            "[{}] {:?} transaction, {} instruction(s), {} account key(s), lookup tables={}",
            PipelineStage::Simulating,
            decoded.format,
            decoded.instructions.len(),
            decoded.account_keys.len(),
            decoded.uses_lookup_tables()
        );
        let report = self
            .provider
            .simulate(&decoded.transaction, &decoded.account_keys)
            .await
            .map_err(|e| self.transport_failed(e))?;

        // Step 3: Analyze
        Ok(self.build_outcome(&bytes, &decoded, report))
    }

    /// Explain a transaction that already landed.
    ///
    /// The recorded execution stands in for a fresh simulation.
    pub async fn analyze_signature(&self, signature: &Signature) -> Result<SimulationOutcome> {
        info!("[{}] signature {}", PipelineStage::Decoding, signature);

        let confirmed = self
            .provider
            .get_confirmed_transaction(signature)
            .await
            .map_err(|e| self.transport_failed(e))?;

        debug!("Signature {} landed in slot {}", signature, confirmed.slot);

        let decoded = TransactionDecoder::new(self.provider.as_ref())
            .decode_bytes(&confirmed.raw_transaction)
            .await
            .map_err(|e| self.decode_failed(e))?;

        Ok(self.build_outcome(&confirmed.raw_transaction, &decoded, confirmed.report))
    }

    pub async fn analyze_signature_str(&self, signature: &str) -> Result<SimulationOutcome> {
        let signature = Signature::from_str(signature.trim())?;
        self.analyze_signature(&signature).await
    }

    /// Analyze several transactions one after another
    pub async fn analyze_batch(&self, inputs: &[String]) -> Vec<Result<SimulationOutcome>> {
        let mut results = Vec::with_capacity(inputs.len());

        for input in inputs {
            results.push(self.analyze_base64(input).await);
        }

        results
    }

    /// Assemble the full outcome from a decoded transaction and its execution
    pub fn build_outcome(
        &self,
        raw_transaction: &[u8],
        decoded: &DecodedTransaction,
        report: ExecutionReport,
    ) -> SimulationOutcome {
        let error = report.error.as_deref();

        let instructions = self.classifier.classify_all(&decoded.instructions);
        let human_summary = narrative::summary(&instructions, &report.logs, error);
        let status = stale::classify(error, &human_summary);

        info!("[{}] status={:?}", PipelineStage::Classifying, status);
        if let Some(error) = error {
            warn!("Simulation failed ({:?}): {}", status, error);
        }

        let cpi_tree = build_cpi_tree(&report.logs, &self.registry);
        let risk_analysis = if status.is_stale() {
            RiskAnalysis::suppressed()
        } else {
            self.risk_scorer
                .analyze(&instructions, &report.logs, report.compute_units_consumed)
        };
        let warnings = narrative::warnings(&instructions, &risk_analysis, status);

        info!(
            "[{}] score={}, level={:?}, warnings={}, cpi roots={}, cpi nodes={}",
            PipelineStage::Analyzing,
            risk_analysis.score,
            risk_analysis.level,
            warnings.len(),
            cpi_tree.len(),
            cpi_tree.iter().map(CpiNode::size).sum::<usize>()
        );

        let outcome = SimulationOutcome {
            success: report.error.is_none(),
            status,
            accounts: self.account_changes(&report.accounts),
            error: report.error,
            logs: report.logs,
            compute_units_used: report.compute_units_consumed,
            instructions,
            cpi_tree,
            risk_analysis,
            human_summary,
            warnings,
            fingerprint: fingerprint(raw_transaction),
            analyzed_at: Utc::now(),
        };

        info!("[{}] {}", PipelineStage::Complete, outcome.fingerprint);
        outcome
    }

    fn account_changes(&self, accounts: &[(Pubkey, AccountSnapshot)]) -> Vec<AccountChange> {
        accounts
            .iter()
            .map(|(pubkey, after)| AccountChange {
                pubkey: pubkey.to_string(),
                label: self
                    .registry
                    .contains(pubkey)
                    .then(|| self.registry.name_of(pubkey).to_string()),
                after: after.clone(),
                is_closed: after.lamports == 0,
            })
            .collect()
    }

    fn decode_failed(&self, err: SimLensError) -> SimLensError {
        warn!("[{}] {}", PipelineStage::DecodeFailed, err);
        err
    }

    fn transport_failed(&self, err: SimLensError) -> SimLensError {
        warn!("[{}] {}", PipelineStage::TransportFailed, err);
        err
    }
}

/// Hex sha256 of the raw transaction bytes
pub fn fingerprint(raw_transaction: &[u8]) -> String {
    hex::encode(Sha256::digest(raw_transaction))
}
