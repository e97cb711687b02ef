//! Reflex fast path: sub-latency response to acute stimuli.
//!
//! The tonic pipeline has pool latency built in; a sudden threat would take
//! several steps to show up in receptor signals. The reflex path shortcuts
//! this: a surge computed from the stimulus alone is blended into
//! adrenaline-bound receptor activations in the same `advance()` call.
//!
//! Pure function of the stimulus. Touching gland inventory or pool
//! concentration here would break the mass ledger.

use soma_core::stimulus::StimulusVector;

/// Surge magnitude for a stimulus, in [0, 1].
///
/// Zero at or below `threshold`, rising linearly to `gain` at full intensity.
/// A threshold at or above 1.0 disables the path.
pub fn reflex_surge(stimulus: &StimulusVector, threshold: f32, gain: f32) -> f32 {
    let s = stimulus.clamped();
    if threshold >= 1.0 || s.intensity <= threshold {
        return 0.0;
    }
    let over = (s.intensity - threshold) / (1.0 - threshold);
    (gain * over).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_is_silent() {
        let s = StimulusVector::new(0.0, 0.5, 0.8);
        assert_eq!(reflex_surge(&s, 0.8, 0.6), 0.0);
    }

    #[test]
    fn test_surge_scales_with_overage() {
        let s = StimulusVector::new(0.0, 0.5, 0.9);
        let surge = reflex_surge(&s, 0.8, 0.6);
        assert!((surge - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_full_intensity_reaches_gain() {
        let s = StimulusVector::new(0.0, 0.5, 1.0);
        let surge = reflex_surge(&s, 0.8, 0.6);
        assert!((surge - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_when_threshold_saturated() {
        let s = StimulusVector::new(0.0, 0.5, 1.0);
        assert_eq!(reflex_surge(&s, 1.0, 0.6), 0.0);
    }

    #[test]
    fn test_nan_intensity_is_silent() {
        let s = StimulusVector {
            valence: 0.0,
            arousal: 0.5,
            intensity: f32::NAN,
        };
        assert_eq!(reflex_surge(&s, 0.8, 0.6), 0.0);
    }
}
