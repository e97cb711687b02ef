//! Deterministic kinetics pipeline and autonomic integration.
//!
//! One `advance()` call moves a stimulus through four fixed stages:
//!
//! 1. stimulus-conditioned drive modulation per substance,
//! 2. gland secretion (finite inventory, fatigue, Hill-Langmuir response),
//! 3. transport pool influx and exponential clearance,
//! 4. receptor binding transduction.
//!
//! A parallel reflex path handles acute stimuli below pool latency: a surge
//! computed from the stimulus alone is blended into adrenaline-bound receptor
//! activations in the same call, without touching gland or pool state.
//!
//! Everything here is synchronous and wall-clock free. Given the same prior
//! state, stimulus and `dt`, `advance()` produces identical output; the mass
//! ledger (inventory + dissolved mass + cleared mass) is constant across any
//! call sequence.

pub mod autonomic;
pub mod engine;
pub mod gland;
pub mod pool;
pub mod receptor;
pub mod reflex;

pub use autonomic::AutonomicIntegrator;
pub use engine::KineticsEngine;
pub use gland::ProducerUnit;
pub use pool::TransportPool;
pub use receptor::ReceptorUnit;
pub use reflex::reflex_surge;
