//! The kinetics engine: one deterministic step from stimulus to internal
//! state snapshot.

use std::collections::BTreeMap;

use soma_core::config::{DriveWeights, KineticsConfig};
use soma_core::error::InvalidStepError;
use soma_core::state::{InternalStateVector, Substance};
use soma_core::stimulus::StimulusVector;

use crate::gland::ProducerUnit;
use crate::pool::TransportPool;
use crate::receptor::ReceptorUnit;
use crate::reflex::reflex_surge;

/// Owns the full production → transport → receptor chain.
///
/// `advance()` is the only mutation point for the internal state; everything
/// downstream reads the returned snapshot.
pub struct KineticsEngine {
    reflex_threshold: f32,
    reflex_gain: f32,
    drive_weights: BTreeMap<Substance, DriveWeights>,
    glands: BTreeMap<Substance, ProducerUnit>,
    pools: BTreeMap<Substance, TransportPool>,
    receptors: Vec<ReceptorUnit>,
    step_index: u64,
}

impl KineticsEngine {
    pub fn new(config: &KineticsConfig) -> Self {
        let mut drive_weights = BTreeMap::new();
        let mut glands = BTreeMap::new();
        let mut pools = BTreeMap::new();

        for (substance, params) in &config.substances {
            drive_weights.insert(*substance, params.drive);
            glands.insert(*substance, ProducerUnit::new(*params));
            pools.insert(
                *substance,
                TransportPool::new(
                    params.half_life_secs,
                    config.distribution_volume_ml,
                    config.concentration_cap,
                ),
            );
        }

        let receptors = config
            .receptors
            .iter()
            .map(|p| ReceptorUnit::new(*p))
            .collect();

        Self {
            reflex_threshold: config.reflex_threshold,
            reflex_gain: config.reflex_gain,
            drive_weights,
            glands,
            pools,
            receptors,
            step_index: 0,
        }
    }

    /// Advance the simulation by `dt` seconds under `stimulus`.
    ///
    /// Step order is fixed: drive modulation, gland secretion, pool influx,
    /// pool decay, receptor transduction, reflex blend. Out-of-range stimulus
    /// channels are clamped; the only failure is a non-positive `dt`.
    pub fn advance(
        &mut self,
        stimulus: &StimulusVector,
        dt: f32,
    ) -> Result<InternalStateVector, InvalidStepError> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(InvalidStepError { dt });
        }
        let stimulus = stimulus.clamped();

        // 1-3: secretion into the pools
        for (substance, gland) in &mut self.glands {
            let weights = &self.drive_weights[substance];
            let released = gland.step(drive_input(weights, &stimulus), dt);
            if let Some(pool) = self.pools.get_mut(substance) {
                pool.influx(released);
            }
        }

        // 3b: clearance
        for pool in self.pools.values_mut() {
            pool.decay(dt);
        }

        // 4: transduction
        for receptor in &mut self.receptors {
            let concentration = self
                .pools
                .get(&receptor.substance())
                .map(|p| p.concentration())
                .unwrap_or(0.0);
            receptor.transduce(concentration);
        }

        // Reflex fast path, same call, pools untouched
        let surge = reflex_surge(&stimulus, self.reflex_threshold, self.reflex_gain);
        if surge > 0.0 {
            tracing::debug!(surge, intensity = stimulus.intensity, "reflex surge");
            for receptor in &mut self.receptors {
                if receptor.substance() == Substance::Adrenaline {
                    receptor.blend_surge(surge);
                }
            }
        }

        self.step_index += 1;
        Ok(self.snapshot())
    }

    /// Snapshot the current state without advancing it.
    pub fn snapshot(&self) -> InternalStateVector {
        let mut state = InternalStateVector {
            step_index: self.step_index,
            ..Default::default()
        };
        for (substance, gland) in &self.glands {
            state.glands.insert(*substance, gland.snapshot());
        }
        for (substance, pool) in &self.pools {
            state.pools.insert(*substance, pool.snapshot());
        }
        for receptor in &self.receptors {
            state
                .regions
                .entry(receptor.region())
                .or_default()
                .push(receptor.snapshot());
        }
        state
    }

    /// Conservation ledger: gland inventories plus dissolved mass plus
    /// cleared mass. Constant across any `advance()` sequence.
    pub fn total_mass(&self) -> f32 {
        let inventory: f32 = self.glands.values().map(|g| g.inventory_mass()).sum();
        let pooled: f32 = self.pools.values().map(|p| p.total_mass()).sum();
        inventory + pooled
    }
}

/// Stimulus-conditioned drive modulation for one substance.
fn drive_input(weights: &DriveWeights, stimulus: &StimulusVector) -> f32 {
    let valence_term = if stimulus.valence >= 0.0 {
        weights.valence_pos * stimulus.valence
    } else {
        weights.valence_neg * (-stimulus.valence)
    };
    (weights.intensity * stimulus.intensity + weights.arousal * stimulus.arousal + valence_term)
        .max(0.0)
}
