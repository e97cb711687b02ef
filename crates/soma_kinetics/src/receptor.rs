//! Receptor units: saturating binding transduction per brain region.

use soma_core::config::ReceptorParams;
use soma_core::state::{sanitize_f32, ReceptorSnapshot, Region, Substance};

/// One receptor unit. Activation follows the occupancy curve
/// `(C / (C + Kd)) * max_density * efficacy`, clamped to [0, 1].
#[derive(Debug, Clone)]
pub struct ReceptorUnit {
    params: ReceptorParams,
    activation: f32,
}

impl ReceptorUnit {
    pub fn new(params: ReceptorParams) -> Self {
        Self {
            params,
            activation: 0.0,
        }
    }

    pub fn region(&self) -> Region {
        self.params.region
    }

    pub fn substance(&self) -> Substance {
        self.params.substance
    }

    pub fn activation(&self) -> f32 {
        self.activation
    }

    /// Recompute activation from the current pool concentration.
    pub fn transduce(&mut self, concentration: f32) {
        let c = sanitize_f32(concentration, 0.0).max(0.0);
        let kd = self.params.kd.max(f32::EPSILON);
        let occupancy = c / (c + kd);
        self.activation =
            (occupancy * self.params.max_density * self.params.efficacy).clamp(0.0, 1.0);
    }

    /// Additive blend for the reflex fast path. Gland and pool state are
    /// untouched; only the transduced signal is raised.
    pub fn blend_surge(&mut self, surge: f32) {
        self.activation = (self.activation + surge.max(0.0)).clamp(0.0, 1.0);
    }

    pub fn snapshot(&self) -> ReceptorSnapshot {
        ReceptorSnapshot {
            substance: self.params.substance,
            activation: self.activation,
        }
    }
}
