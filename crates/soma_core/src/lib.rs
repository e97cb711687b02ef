//! Shared data model for the soma simulation core.
//!
//! Three layers build on these types:
//! - a kinetics pipeline that turns a [`StimulusVector`] into an
//!   [`InternalStateVector`] (production → transport → receptor binding),
//! - an autonomic integrator that reduces receptor signals to an
//!   [`AutonomicBalance`],
//! - a retrieval layer that matches historical records against the current
//!   state.
//!
//! This crate carries no behavior beyond construction-time validation and the
//! deterministic [`InternalStateVector::flatten`] projection used for state
//! similarity matching.

pub mod config;
pub mod error;
pub mod state;
pub mod stimulus;

pub use config::{
    DriveWeights, IntegratorConfig, KineticsConfig, ReceptorParams, RetrievalConfig, SomaConfig,
    StreamParams, SubstanceParams,
};
pub use error::InvalidStepError;
pub use state::{
    sanitize_f32, AutonomicBalance, GlandSnapshot, GlandStatus, InternalStateVector, PoolSnapshot,
    ReceptorSnapshot, Region, Substance,
};
pub use stimulus::StimulusVector;
