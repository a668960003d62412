use crate::consensus::{aggregate_confidence, recommend};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use verdant_agents::Agent;
use verdant_types::{AgentResponse, VerificationCheck, VerificationResult};

/// Default time a single verifier gets to finish both its check and its own answer.
pub const DEFAULT_VERIFIER_TIMEOUT: Duration = Duration::from_secs(90);

/// Placeholder answer for a verifier that ran out of time.
const VERIFIER_TIMED_OUT: &str = "Verification timed out before this agent could answer";

/// Cross-checks one agent's answer against a set of secondary agents.
#[derive(Debug, Clone)]
pub struct VerificationService {
    verifier_timeout: Duration,
}

impl Default for VerificationService {
    fn default() -> Self {
        Self::new(DEFAULT_VERIFIER_TIMEOUT)
    }
}

impl VerificationService {
    pub fn new(verifier_timeout: Duration) -> Self {
        Self { verifier_timeout }
    }

    pub fn verifier_timeout(&self) -> Duration {
        self.verifier_timeout
    }

    /// Runs every verifier concurrently against `primary` and combines the
    /// results.
    ///
    /// Each verifier both judges the primary answer and answers `query`
    /// itself. A verifier that errors or times out contributes
    /// [`VerificationCheck::failed`] instead of aborting the run, so this
    /// never fails.
    ///
    /// Consensus needs at least half the verifiers (rounded up) to agree, so
    /// an empty verifier set reaches it trivially and the primary's own
    /// confidence stands.
    pub async fn perform_cross_verification(
        &self,
        primary: &AgentResponse,
        verifiers: &[Arc<dyn Agent>],
        query: &str,
    ) -> VerificationResult {
        let runs = verifiers
            .iter()
            .map(|verifier| self.run_verifier(verifier.as_ref(), primary, query));
        let (checks, verifying_responses): (Vec<VerificationCheck>, Vec<AgentResponse>) =
            join_all(runs).await.into_iter().unzip();

        let total = checks.len();
        let agreeing = checks.iter().filter(|c| c.consensus_reached).count();
        let consensus_reached = agreeing >= total.div_ceil(2);
        if total == 0 {
            warn!(agent = %primary.agent, "cross verification requested with no verifiers");
        }

        let confidences: Vec<u8> = std::iter::once(primary.confidence)
            .chain(verifying_responses.iter().map(|r| r.confidence))
            .collect();
        let final_confidence = aggregate_confidence(consensus_reached, &confidences);

        let discrepancies: Vec<String> = checks
            .into_iter()
            .flat_map(|c| c.discrepancies)
            .filter(|d| !d.is_empty())
            .collect();
        let recommendation = recommend(consensus_reached, final_confidence, &discrepancies);

        info!(
            agent = %primary.agent,
            verifiers = total,
            agreeing,
            consensus = consensus_reached,
            final_confidence,
            "cross verification complete"
        );

        VerificationResult {
            consensus_reached,
            final_confidence,
            discrepancies,
            recommendation,
            verifying_responses,
        }
    }

    async fn run_verifier(
        &self,
        verifier: &dyn Agent,
        primary: &AgentResponse,
        query: &str,
    ) -> (VerificationCheck, AgentResponse) {
        let agent = verifier.agent_type();
        let work = async {
            tokio::join!(
                verifier.verify_against(primary, query),
                verifier.process_query(query, None)
            )
        };

        match tokio::time::timeout(self.verifier_timeout, work).await {
            Ok((Ok(check), outcome)) => (check, outcome.into_response()),
            Ok((Err(e), outcome)) => {
                warn!(verifier = %agent, "verifier check failed: {}", e);
                (VerificationCheck::failed(), outcome.into_response())
            }
            Err(_) => {
                warn!(
                    verifier = %agent,
                    timeout_secs = self.verifier_timeout.as_secs(),
                    "verifier timed out"
                );
                (
                    VerificationCheck::failed(),
                    AgentResponse::degraded(agent, VERIFIER_TIMED_OUT),
                )
            }
        }
    }
}
