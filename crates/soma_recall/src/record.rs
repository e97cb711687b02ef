//! Historical interaction records.
//!
//! Records are written once by an external persistence collaborator and never
//! mutated afterwards; all validation happens at construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use soma_core::state::sanitize_f32;

/// Five-axis sensory texture captured at encoding time.
/// All axes live in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensoryTexture {
    pub stress: f32,
    pub warmth: f32,
    pub clarity: f32,
    pub drive: f32,
    pub calm: f32,
}

impl Default for SensoryTexture {
    fn default() -> Self {
        Self {
            stress: 0.2,
            warmth: 0.5,
            clarity: 0.5,
            drive: 0.3,
            calm: 0.4,
        }
    }
}

impl SensoryTexture {
    pub fn new(stress: f32, warmth: f32, clarity: f32, drive: f32, calm: f32) -> Self {
        let clamp = |v: f32| sanitize_f32(v, 0.0).clamp(0.0, 1.0);
        Self {
            stress: clamp(stress),
            warmth: clamp(warmth),
            clarity: clamp(clarity),
            drive: clamp(drive),
            calm: clamp(calm),
        }
    }

    /// Normalized L2 magnitude in [0, 1]; how sensorially vivid the moment was.
    pub fn magnitude(&self) -> f32 {
        let sum_sq = self.stress * self.stress
            + self.warmth * self.warmth
            + self.clarity * self.clarity
            + self.drive * self.drive
            + self.calm * self.calm;
        (sum_sq / 5.0).sqrt().clamp(0.0, 1.0)
    }
}

/// One immutable past interaction.
///
/// `state_trace` is the flattened internal state (plus balance channels)
/// captured when the record was written; the state stream matches on it.
/// `parent_id` links records into narrative chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub tags: BTreeSet<String>,

    /// Impact score in [0, 1]
    pub salience: f32,

    pub texture: SensoryTexture,

    /// Key set for structural pattern matching
    pub pattern_key: BTreeSet<String>,

    /// Captured flattened state + balance at encoding time
    pub state_trace: Vec<f32>,

    /// Previous record in the narrative chain, if any
    pub parent_id: Option<Uuid>,

    /// Present only on meta-reflection records; depth in [0, 1]
    pub reflection_depth: Option<f32>,
}

impl HistoricalRecord {
    /// New record with a fresh id and neutral optional fields.
    pub fn new(timestamp: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            content: content.into(),
            tags: BTreeSet::new(),
            salience: 0.0,
            texture: SensoryTexture::new(0.0, 0.0, 0.0, 0.0, 0.0),
            pattern_key: BTreeSet::new(),
            state_trace: Vec::new(),
            parent_id: None,
            reflection_depth: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_salience(mut self, salience: f32) -> Self {
        self.salience = sanitize_f32(salience, 0.0).clamp(0.0, 1.0);
        self
    }

    pub fn with_texture(mut self, texture: SensoryTexture) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_pattern_key<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pattern_key = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Store the captured state trace; non-finite components are zeroed.
    pub fn with_state_trace(mut self, trace: Vec<f32>) -> Self {
        self.state_trace = trace.into_iter().map(|v| sanitize_f32(v, 0.0)).collect();
        self
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_reflection_depth(mut self, depth: f32) -> Self {
        self.reflection_depth = Some(sanitize_f32(depth, 0.0).clamp(0.0, 1.0));
        self
    }

    /// Age relative to `now`, in fractional days; never negative.
    pub fn age_days(&self, now: DateTime<Utc>) -> f32 {
        let secs = (now - self.timestamp).num_seconds();
        (secs.max(0) as f32) / 86_400.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_builder_clamps_salience() {
        let r = HistoricalRecord::new(Utc::now(), "x").with_salience(3.0);
        assert_eq!(r.salience, 1.0);
        let r = HistoricalRecord::new(Utc::now(), "x").with_salience(f32::NAN);
        assert_eq!(r.salience, 0.0);
    }

    #[test]
    fn test_state_trace_sanitized() {
        let r = HistoricalRecord::new(Utc::now(), "x")
            .with_state_trace(vec![0.5, f32::NAN, f32::INFINITY]);
        assert_eq!(r.state_trace, vec![0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_texture_magnitude_range() {
        let zero = SensoryTexture::new(0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(zero.magnitude(), 0.0);
        let full = SensoryTexture::new(1.0, 1.0, 1.0, 1.0, 1.0);
        assert!((full.magnitude() - 1.0).abs() < 1e-6);
        let mid = SensoryTexture::default();
        assert!(mid.magnitude() > 0.0 && mid.magnitude() < 1.0);
    }

    #[test]
    fn test_age_days_never_negative() {
        let now = Utc::now();
        let future = HistoricalRecord::new(now + Duration::days(2), "x");
        assert_eq!(future.age_days(now), 0.0);
        let past = HistoricalRecord::new(now - Duration::days(3), "x");
        assert!((past.age_days(now) - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_reflection_depth_optional() {
        let plain = HistoricalRecord::new(Utc::now(), "x");
        assert!(plain.reflection_depth.is_none());
        let meta = plain.clone().with_reflection_depth(1.5);
        assert_eq!(meta.reflection_depth, Some(1.0));
    }
}
