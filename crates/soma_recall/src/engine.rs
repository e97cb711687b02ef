//! Stream merge: per-stream top-k selection into one concatenated result set.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

use soma_core::config::{RetrievalConfig, StreamParams};
use soma_core::state::{AutonomicBalance, InternalStateVector};

use crate::record::HistoricalRecord;
use crate::streams::{decay_factor, run_stream, StreamKind};

/// Everything a retrieval call matches against.
#[derive(Debug, Clone)]
pub struct RecallQuery {
    /// Semantic tags extracted upstream for this turn
    pub tags: BTreeSet<String>,

    /// Flattened current state plus balance channels, in snapshot order
    pub state_vec: Vec<f32>,

    /// Caller-supplied clock; retrieval itself never reads the wall clock
    pub now: DateTime<Utc>,
}

impl RecallQuery {
    /// Build the query from the turn's fresh snapshot and balance.
    /// The balance channels are appended to the flattened state so records
    /// captured the same way compare component-for-component.
    pub fn new(
        tags: BTreeSet<String>,
        state: &InternalStateVector,
        balance: &AutonomicBalance,
        now: DateTime<Utc>,
    ) -> Self {
        let mut state_vec = state.flatten();
        state_vec.push(balance.sympathetic);
        state_vec.push(balance.parasympathetic);
        Self {
            tags,
            state_vec,
            now,
        }
    }
}

/// One retrieval hit. The same record may appear once per stream it
/// qualifies for; `stream` tells them apart.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    pub record_id: Uuid,
    pub stream: StreamKind,

    /// Stream score before temporal decay
    pub raw_score: f32,

    /// `raw_score` times the shared age-decay multiplier
    pub decayed_score: f32,

    pub metadata: Option<serde_json::Value>,
}

/// The seven-stream retrieval engine. Stateless between calls; all tuning
/// comes from [`RetrievalConfig`].
pub struct RetrievalEngine {
    config: RetrievalConfig,
}

impl RetrievalEngine {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn params(&self, kind: StreamKind) -> StreamParams {
        match kind {
            StreamKind::Sequence => self.config.sequence,
            StreamKind::Salience => self.config.salience,
            StreamKind::Sensory => self.config.sensory,
            StreamKind::Pattern => self.config.pattern,
            StreamKind::State => self.config.state,
            StreamKind::Recency => self.config.recency,
            StreamKind::Reflection => self.config.reflection,
        }
    }

    /// Run every enabled stream over the records and concatenate their
    /// top-k picks in fixed stream order.
    ///
    /// Duplicates across streams are kept on purpose (the stream a record
    /// surfaced through is meaningful), and the output is NOT globally
    /// re-sorted; callers wanting one flat ranking sort client-side.
    /// An empty pool or a stream with no qualifying candidates contributes
    /// nothing; neither is an error.
    pub fn retrieve(
        &self,
        query: &RecallQuery,
        records: &[HistoricalRecord],
        enabled: &BTreeSet<StreamKind>,
    ) -> Vec<RankedMatch> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for kind in StreamKind::ALL {
            if !enabled.contains(&kind) {
                continue;
            }
            let params = self.params(kind);
            if params.top_k == 0 {
                continue;
            }

            let mut candidates =
                run_stream(kind, records, query, self.config.recency_halflife_days);
            candidates.retain(|c| c.raw_score >= params.threshold);

            // Deterministic ranking: score, then newest, then id
            candidates.sort_by(|a, b| {
                b.raw_score
                    .partial_cmp(&a.raw_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| records[b.index].timestamp.cmp(&records[a.index].timestamp))
                    .then_with(|| records[a.index].id.cmp(&records[b.index].id))
            });
            candidates.truncate(params.top_k);

            tracing::trace!(
                stream = kind.name(),
                candidates = candidates.len(),
                "stream merged"
            );

            for c in candidates {
                let record = &records[c.index];
                let decay = decay_factor(record, query.now, self.config.recency_halflife_days);
                matches.push(RankedMatch {
                    record_id: record.id,
                    stream: kind,
                    raw_score: c.raw_score,
                    decayed_score: c.raw_score * decay,
                    metadata: Some(c.metadata),
                });
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn engine() -> RetrievalEngine {
        RetrievalEngine::new(&RetrievalConfig::default())
    }

    fn query_at(now: DateTime<Utc>) -> RecallQuery {
        RecallQuery {
            tags: BTreeSet::new(),
            state_vec: Vec::new(),
            now,
        }
    }

    #[test]
    fn test_empty_pool_yields_empty_result() {
        let now = Utc::now();
        let out = engine().retrieve(&query_at(now), &[], &StreamKind::all_enabled());
        assert!(out.is_empty());
    }

    #[test]
    fn test_disabled_streams_contribute_nothing() {
        let now = Utc::now();
        let records = vec![HistoricalRecord::new(now, "x").with_salience(0.9)];
        let enabled: BTreeSet<StreamKind> = [StreamKind::Salience].into();
        let out = engine().retrieve(&query_at(now), &records, &enabled);
        assert!(out.iter().all(|m| m.stream == StreamKind::Salience));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_top_k_caps_stream_output() {
        let now = Utc::now();
        let records: Vec<_> = (0..10)
            .map(|i| {
                HistoricalRecord::new(now - Duration::minutes(i), "x").with_salience(0.8)
            })
            .collect();
        let enabled: BTreeSet<StreamKind> = [StreamKind::Salience].into();
        let out = engine().retrieve(&query_at(now), &records, &enabled);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_salience_threshold_filters() {
        let now = Utc::now();
        let records = vec![
            HistoricalRecord::new(now, "keep").with_salience(0.75),
            HistoricalRecord::new(now, "drop").with_salience(0.5),
        ];
        let enabled: BTreeSet<StreamKind> = [StreamKind::Salience].into();
        let out = engine().retrieve(&query_at(now), &records, &enabled);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record_id, records[0].id);
    }

    #[test]
    fn test_no_cross_stream_dedup() {
        let now = Utc::now();
        // Fresh, salient, meta record qualifies for several streams at once
        let r = HistoricalRecord::new(now, "everything")
            .with_salience(0.95)
            .with_reflection_depth(0.9);
        let records = vec![r.clone()];
        let enabled: BTreeSet<StreamKind> =
            [StreamKind::Salience, StreamKind::Recency, StreamKind::Reflection].into();
        let out = engine().retrieve(&query_at(now), &records, &enabled);

        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|m| m.record_id == r.id));
        let streams: BTreeSet<StreamKind> = out.iter().map(|m| m.stream).collect();
        assert_eq!(streams.len(), 3);
    }

    #[test]
    fn test_output_keeps_stream_order_not_global_sort() {
        let now = Utc::now();
        // Low-salience fresh record vs high-salience old record: a global
        // re-sort would interleave them, stream order must not
        let records = vec![
            HistoricalRecord::new(now, "fresh").with_salience(0.71),
            HistoricalRecord::new(now - Duration::days(300), "old").with_salience(0.99),
        ];
        let enabled: BTreeSet<StreamKind> = [StreamKind::Salience, StreamKind::Recency].into();
        let out = engine().retrieve(&query_at(now), &records, &enabled);

        let first_recency = out.iter().position(|m| m.stream == StreamKind::Recency);
        let last_salience = out
            .iter()
            .rposition(|m| m.stream == StreamKind::Salience);
        assert!(last_salience.unwrap() < first_recency.unwrap());
    }

    #[test]
    fn test_decayed_score_applies_to_every_stream() {
        let now = Utc::now();
        let aged = HistoricalRecord::new(now - Duration::days(30), "aged").with_salience(0.8);
        let records = vec![aged];
        let enabled: BTreeSet<StreamKind> = [StreamKind::Salience].into();
        let out = engine().retrieve(&query_at(now), &records, &enabled);

        assert_eq!(out.len(), 1);
        assert!((out[0].raw_score - 0.8).abs() < 1e-6);
        assert!((out[0].decayed_score - 0.4).abs() < 1e-3);
    }

    #[test]
    fn test_query_appends_balance_channels() {
        let state = InternalStateVector::default();
        let balance = AutonomicBalance {
            sympathetic: 0.7,
            parasympathetic: 0.3,
        };
        let q = RecallQuery::new(BTreeSet::new(), &state, &balance, Utc::now());
        assert_eq!(q.state_vec, vec![0.7, 0.3]);
    }
}
