//! The seven retrieval streams.
//!
//! Each stream is a pure scoring pass over the record pool: a candidate
//! filter plus a score in [0, 1]. Streams share nothing but read-only access
//! to the records and the query; the engine merges their outputs.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::engine::RecallQuery;
use crate::record::HistoricalRecord;

/// Stream identity. Carried on every match; callers treat it as meaningful
/// metadata, not noise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Parent-chain proximity to the most recent record
    Sequence,
    /// High-impact records by stored salience
    Salience,
    /// Sensorially vivid records by texture magnitude
    Sensory,
    /// Structural overlap between pattern keys and query tags
    Pattern,
    /// Cosine similarity of captured state traces to the current state
    State,
    /// Pure age decay
    Recency,
    /// Meta-reflection records by depth
    Reflection,
}

impl StreamKind {
    pub const ALL: [StreamKind; 7] = [
        StreamKind::Sequence,
        StreamKind::Salience,
        StreamKind::Sensory,
        StreamKind::Pattern,
        StreamKind::State,
        StreamKind::Recency,
        StreamKind::Reflection,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StreamKind::Sequence => "sequence",
            StreamKind::Salience => "salience",
            StreamKind::Sensory => "sensory",
            StreamKind::Pattern => "pattern",
            StreamKind::State => "state",
            StreamKind::Recency => "recency",
            StreamKind::Reflection => "reflection",
        }
    }

    /// Every stream enabled.
    pub fn all_enabled() -> BTreeSet<StreamKind> {
        Self::ALL.iter().copied().collect()
    }
}

/// One pre-merge candidate: index into the record slice, raw score, and
/// stream-specific metadata.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub index: usize,
    pub raw_score: f32,
    pub metadata: serde_json::Value,
}

/// Score every qualifying record for one stream. Records the stream's filter
/// rejects are simply absent from the output.
pub(crate) fn run_stream(
    kind: StreamKind,
    records: &[HistoricalRecord],
    query: &RecallQuery,
    recency_halflife_days: f32,
) -> Vec<Candidate> {
    match kind {
        StreamKind::Sequence => sequence_stream(records),
        StreamKind::Salience => salience_stream(records),
        StreamKind::Sensory => sensory_stream(records),
        StreamKind::Pattern => pattern_stream(records, &query.tags),
        StreamKind::State => state_stream(records, &query.state_vec),
        StreamKind::Recency => recency_stream(records, query, recency_halflife_days),
        StreamKind::Reflection => reflection_stream(records),
    }
}

/// Shared temporal decay multiplier: `2^(-age_days / halflife_days)`.
/// A record aged exactly one half-life scores half of a fresh one.
pub(crate) fn decay_factor(
    record: &HistoricalRecord,
    now: chrono::DateTime<chrono::Utc>,
    halflife_days: f32,
) -> f32 {
    let halflife = halflife_days.max(f32::EPSILON);
    (-std::f32::consts::LN_2 * record.age_days(now) / halflife)
        .exp()
        .clamp(0.0, 1.0)
}

// ============================================================================
// Stream 1: sequence
// ============================================================================

/// Walk the parent chain back from the most recent record; proximity score
/// `1 / (1 + distance)`. Records off the chain do not qualify.
fn sequence_stream(records: &[HistoricalRecord]) -> Vec<Candidate> {
    let latest = match records
        .iter()
        .enumerate()
        .max_by_key(|(_, r)| (r.timestamp, r.id))
    {
        Some((i, _)) => i,
        None => return Vec::new(),
    };

    let by_id: HashMap<Uuid, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id, i))
        .collect();

    let mut distances: HashMap<usize, usize> = HashMap::new();
    let mut current = latest;
    let mut distance = 0usize;
    // Cycle guard: a well-formed chain visits each record at most once
    while distances.len() <= records.len() {
        if distances.contains_key(&current) {
            break;
        }
        distances.insert(current, distance);
        match records[current].parent_id.and_then(|p| by_id.get(&p)) {
            Some(&parent) => {
                current = parent;
                distance += 1;
            }
            None => break,
        }
    }

    let mut out: Vec<Candidate> = distances
        .into_iter()
        .map(|(index, d)| Candidate {
            index,
            raw_score: 1.0 / (1.0 + d as f32),
            metadata: json!({
                "chain_distance": d,
                "parent_id": records[index].parent_id,
            }),
        })
        .collect();
    out.sort_by_key(|c| c.index);
    out
}

// ============================================================================
// Streams 2-4: salience, sensory, pattern
// ============================================================================

fn salience_stream(records: &[HistoricalRecord]) -> Vec<Candidate> {
    records
        .iter()
        .enumerate()
        .map(|(index, r)| Candidate {
            index,
            raw_score: r.salience,
            metadata: json!({ "salience": r.salience }),
        })
        .collect()
}

fn sensory_stream(records: &[HistoricalRecord]) -> Vec<Candidate> {
    records
        .iter()
        .enumerate()
        .map(|(index, r)| {
            let magnitude = r.texture.magnitude();
            Candidate {
                index,
                raw_score: magnitude,
                metadata: json!({ "texture_magnitude": magnitude }),
            }
        })
        .collect()
}

/// Jaccard similarity between the record's pattern key and the query tags.
/// Zero-overlap records are filtered out.
fn pattern_stream(records: &[HistoricalRecord], tags: &BTreeSet<String>) -> Vec<Candidate> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, r)| {
            let intersection = r.pattern_key.intersection(tags).count();
            if intersection == 0 {
                return None;
            }
            let union = r.pattern_key.union(tags).count();
            Some(Candidate {
                index,
                raw_score: intersection as f32 / union as f32,
                metadata: json!({ "key_overlap": intersection }),
            })
        })
        .collect()
}

// ============================================================================
// Stream 5: state similarity
// ============================================================================

fn state_stream(records: &[HistoricalRecord], state_vec: &[f32]) -> Vec<Candidate> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, r)| {
            let similarity = cosine_similarity(&r.state_trace, state_vec)?;
            Some(Candidate {
                index,
                raw_score: similarity,
                metadata: json!({ "state_similarity": similarity }),
            })
        })
        .collect()
}

/// Cosine similarity clamped to [0, 1]. `None` when the vectors are
/// incomparable (length mismatch, empty, or zero magnitude).
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return None;
    }
    Some((dot / (mag_a * mag_b)).clamp(0.0, 1.0))
}

// ============================================================================
// Streams 6-7: recency, reflection
// ============================================================================

/// Every record qualifies; score is the age decay itself.
fn recency_stream(
    records: &[HistoricalRecord],
    query: &RecallQuery,
    halflife_days: f32,
) -> Vec<Candidate> {
    records
        .iter()
        .enumerate()
        .map(|(index, r)| Candidate {
            index,
            raw_score: decay_factor(r, query.now, halflife_days),
            metadata: json!({ "age_days": r.age_days(query.now) }),
        })
        .collect()
}

fn reflection_stream(records: &[HistoricalRecord]) -> Vec<Candidate> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, r)| {
            let depth = r.reflection_depth?;
            Some(Candidate {
                index,
                raw_score: depth,
                metadata: json!({ "reflection_depth": depth }),
            })
        })
        .collect()
}
