//! Autonomic integrator: receptor signals down to a two-channel balance.
//!
//! Each channel is a weighted sum of per-region mean activations, then
//! exponentially smoothed against the carried-over balance so that a single
//! step cannot flip the organism from calm to alarmed.

use soma_core::config::IntegratorConfig;
use soma_core::state::{AutonomicBalance, InternalStateVector, Region};

pub struct AutonomicIntegrator {
    config: IntegratorConfig,
    balance: AutonomicBalance,
}

impl AutonomicIntegrator {
    pub fn new(config: &IntegratorConfig) -> Self {
        let mut config = config.clone();
        config.alpha = config.alpha.clamp(0.0, 1.0);
        Self {
            config,
            balance: AutonomicBalance::default(),
        }
    }

    /// Fold a state snapshot into the balance and return the new value.
    ///
    /// Reads only the snapshot and its own carried-over channels.
    /// `new = alpha * raw + (1 - alpha) * old`.
    pub fn integrate(&mut self, state: &InternalStateVector) -> AutonomicBalance {
        let raw_sympathetic = weighted_sum(&self.config.sympathetic_weights, state);
        let raw_parasympathetic = weighted_sum(&self.config.parasympathetic_weights, state);

        let alpha = self.config.alpha;
        self.balance.sympathetic =
            alpha * raw_sympathetic + (1.0 - alpha) * self.balance.sympathetic;
        self.balance.parasympathetic =
            alpha * raw_parasympathetic + (1.0 - alpha) * self.balance.parasympathetic;
        self.balance.normalize();

        self.balance
    }

    pub fn balance(&self) -> AutonomicBalance {
        self.balance
    }
}

fn weighted_sum(
    weights: &std::collections::BTreeMap<Region, f32>,
    state: &InternalStateVector,
) -> f32 {
    weights
        .iter()
        .map(|(region, w)| w * state.region_activation(*region))
        .sum::<f32>()
        .clamp(0.0, 1.0)
}
