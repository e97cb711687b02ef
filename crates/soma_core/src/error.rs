use thiserror::Error;

/// The only fatal error in the core contract.
///
/// Raised by the kinetics engine when `dt` is not a positive finite number.
/// This is a caller bug; every other anomalous condition (out-of-range
/// stimulus, drained inventory, empty record pool) degrades by clamping,
/// truncation, or empty results instead of failing the turn.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid kinetics step: dt must be positive and finite, got {dt}")]
pub struct InvalidStepError {
    pub dt: f32,
}
