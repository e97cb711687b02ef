//! Gap processing: the synchronous core of one turn.
//!
//! From the orchestrator's point of view this is a single call that must run
//! to completion before the suspended language-model continuation resumes.
//! Order inside the gap is fixed: kinetics step, autonomic integration, then
//! retrieval (the state stream matches against the snapshot produced moments
//! earlier in the same call).

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use soma_core::config::SomaConfig;
use soma_core::state::{AutonomicBalance, InternalStateVector};
use soma_core::stimulus::StimulusVector;
use soma_kinetics::{AutonomicIntegrator, KineticsEngine};

use crate::engine::{RankedMatch, RecallQuery, RetrievalEngine};
use crate::pool::RecordPool;
use crate::streams::StreamKind;

/// What one gap hands back to the context-assembly collaborator.
#[derive(Debug, Clone)]
pub struct GapOutput {
    pub internal_state: InternalStateVector,
    pub balance: AutonomicBalance,
    pub matches: Vec<RankedMatch>,
}

/// Owns the cross-turn state (kinetics engine and integrator) and drives the
/// per-turn pipeline. Constructed once by the orchestrator; no process-wide
/// state anywhere.
pub struct GapProcessor {
    kinetics: KineticsEngine,
    integrator: AutonomicIntegrator,
    retrieval: RetrievalEngine,
    pool: Arc<dyn RecordPool>,
    enabled_streams: BTreeSet<StreamKind>,
}

impl GapProcessor {
    pub fn new(config: &SomaConfig, pool: Arc<dyn RecordPool>) -> Self {
        Self {
            kinetics: KineticsEngine::new(&config.kinetics),
            integrator: AutonomicIntegrator::new(&config.integrator),
            retrieval: RetrievalEngine::new(&config.retrieval),
            pool,
            enabled_streams: StreamKind::all_enabled(),
        }
    }

    /// Restrict retrieval to a subset of streams.
    pub fn with_streams(mut self, enabled: BTreeSet<StreamKind>) -> Self {
        self.enabled_streams = enabled;
        self
    }

    /// Run one full gap.
    ///
    /// The only hard failure is an invalid `dt` from the kinetics step.
    /// An unreachable record pool degrades to empty matches with a warning;
    /// the caller decides what a degraded result means for the response.
    pub async fn process(
        &mut self,
        stimulus: &StimulusVector,
        dt: f32,
        tags: BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Result<GapOutput> {
        let internal_state = self.kinetics.advance(stimulus, dt)?;
        let balance = self.integrator.integrate(&internal_state);

        let records = match self.pool.snapshot().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("record pool unavailable, retrieval degraded: {e:#}");
                Vec::new()
            }
        };

        let query = RecallQuery::new(tags, &internal_state, &balance, now);
        let matches = self.retrieval.retrieve(&query, &records, &self.enabled_streams);

        tracing::debug!(
            step = internal_state.step_index,
            sympathetic = balance.sympathetic,
            matches = matches.len(),
            "gap complete"
        );

        Ok(GapOutput {
            internal_state,
            balance,
            matches,
        })
    }

    /// Current snapshot without advancing the simulation.
    pub fn current_state(&self) -> InternalStateVector {
        self.kinetics.snapshot()
    }

    pub fn current_balance(&self) -> AutonomicBalance {
        self.integrator.balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::InMemoryPool;
    use crate::record::HistoricalRecord;
    use async_trait::async_trait;

    struct BrokenPool;

    #[async_trait]
    impl RecordPool for BrokenPool {
        async fn snapshot(&self) -> Result<Vec<HistoricalRecord>> {
            anyhow::bail!("storage offline")
        }
    }

    #[tokio::test]
    async fn test_invalid_dt_propagates() {
        let pool = Arc::new(InMemoryPool::new());
        let mut gap = GapProcessor::new(&SomaConfig::default(), pool);
        let err = gap
            .process(&StimulusVector::neutral(), 0.0, BTreeSet::new(), Utc::now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("dt"));
    }

    #[tokio::test]
    async fn test_broken_pool_degrades_to_empty_matches() {
        let mut gap = GapProcessor::new(&SomaConfig::default(), Arc::new(BrokenPool));
        let out = gap
            .process(&StimulusVector::neutral(), 1.0, BTreeSet::new(), Utc::now())
            .await
            .unwrap();
        assert!(out.matches.is_empty());
        // The kinetics step still ran
        assert_eq!(out.internal_state.step_index, 1);
    }

    #[tokio::test]
    async fn test_state_advances_across_turns() {
        let pool = Arc::new(InMemoryPool::new());
        let mut gap = GapProcessor::new(&SomaConfig::default(), pool);
        let first = gap
            .process(&StimulusVector::threat(), 1.0, BTreeSet::new(), Utc::now())
            .await
            .unwrap();
        let second = gap
            .process(&StimulusVector::neutral(), 1.0, BTreeSet::new(), Utc::now())
            .await
            .unwrap();
        assert_eq!(first.internal_state.step_index, 1);
        assert_eq!(second.internal_state.step_index, 2);
        // The threat's smoothed imprint persists into the next balance
        assert!(second.balance.sympathetic >= 0.0);
    }
}
