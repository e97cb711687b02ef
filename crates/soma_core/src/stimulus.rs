//! Stimulus input that perturbs the kinetics pipeline.

use serde::{Deserialize, Serialize};

/// One discrete input event. Created per turn by an external intent-extraction
/// collaborator and consumed immediately by the kinetics engine.
///
/// Channel ranges: `valence` in [-1, 1], `arousal` and `intensity` in [0, 1].
/// Out-of-range values are clamped on use, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusVector {
    /// Hedonic direction of the event (-1 = aversive, +1 = appetitive)
    pub valence: f32,

    /// Activation level of the event (0 = flat, 1 = maximally arousing)
    pub arousal: f32,

    /// Overall magnitude; values above the reflex threshold trigger the
    /// fast-path surge in the kinetics engine
    pub intensity: f32,
}

impl Default for StimulusVector {
    fn default() -> Self {
        Self {
            valence: 0.0,
            arousal: 0.3,
            intensity: 0.1,
        }
    }
}

impl StimulusVector {
    /// Create a stimulus with all channels clamped to their declared ranges.
    pub fn new(valence: f32, arousal: f32, intensity: f32) -> Self {
        Self {
            valence,
            arousal,
            intensity,
        }
        .clamped()
    }

    /// Return a copy with every channel clamped. NaN channels fall back to
    /// the neutral default for that channel.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            valence: crate::state::sanitize_f32(self.valence, d.valence).clamp(-1.0, 1.0),
            arousal: crate::state::sanitize_f32(self.arousal, d.arousal).clamp(0.0, 1.0),
            intensity: crate::state::sanitize_f32(self.intensity, d.intensity).clamp(0.0, 1.0),
        }
    }

    /// Quiet background input (no event).
    pub fn neutral() -> Self {
        Self::new(0.0, 0.1, 0.0)
    }

    /// Acute negative event strong enough to trip the reflex path.
    pub fn threat() -> Self {
        Self::new(-0.8, 0.9, 0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_out_of_range() {
        let s = StimulusVector::new(-3.0, 5.0, -1.0);
        assert_eq!(s.valence, -1.0);
        assert_eq!(s.arousal, 1.0);
        assert_eq!(s.intensity, 0.0);
    }

    #[test]
    fn test_clamped_recovers_nan() {
        let s = StimulusVector {
            valence: f32::NAN,
            arousal: f32::INFINITY,
            intensity: 0.5,
        }
        .clamped();
        assert!(s.valence.is_finite());
        assert!(s.arousal.is_finite());
        assert_eq!(s.intensity, 0.5);
    }

    #[test]
    fn test_threat_trips_reflex_range() {
        let s = StimulusVector::threat();
        assert!(s.intensity > 0.8);
        assert!(s.valence < 0.0);
    }
}
