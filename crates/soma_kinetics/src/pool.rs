//! Transport pools ("blood"): per-substance concentration with exponential
//! clearance.
//!
//! Concentration changes through exactly two operations: influx of newly
//! secreted mass diluted into the distribution volume, and first-order decay
//! `C(t) = C0 * exp(-ln2 / half_life * dt)`. Cleared mass is accounted, so
//! `inventory + concentration * volume + cumulative_cleared` is invariant
//! system-wide.

use soma_core::state::{sanitize_f32, PoolSnapshot};

/// Pool state for one substance.
#[derive(Debug, Clone)]
pub struct TransportPool {
    half_life_secs: f32,
    volume_ml: f32,
    concentration_cap: f32,
    concentration: f32,
    cumulative_cleared: f32,
}

impl TransportPool {
    pub fn new(half_life_secs: f32, volume_ml: f32, concentration_cap: f32) -> Self {
        Self {
            half_life_secs: half_life_secs.max(1.0),
            volume_ml: volume_ml.max(1.0),
            concentration_cap: concentration_cap.max(0.0),
            concentration: 0.0,
            cumulative_cleared: 0.0,
        }
    }

    /// Dissolve `mass_pg` into the pool. Mass pushed over the concentration
    /// ceiling is booked as cleared so the ledger stays closed.
    pub fn influx(&mut self, mass_pg: f32) {
        let mass = sanitize_f32(mass_pg, 0.0).max(0.0);
        self.concentration += mass / self.volume_ml;

        if self.concentration > self.concentration_cap {
            let overflow = self.concentration - self.concentration_cap;
            self.cumulative_cleared += overflow * self.volume_ml;
            self.concentration = self.concentration_cap;
        }
    }

    /// First-order clearance over `dt` seconds.
    pub fn decay(&mut self, dt: f32) {
        if dt <= 0.0 || self.concentration <= 0.0 {
            return;
        }
        let k = std::f32::consts::LN_2 / self.half_life_secs;
        let remaining = self.concentration * (-k * dt).exp();
        self.cumulative_cleared += (self.concentration - remaining) * self.volume_ml;
        self.concentration = remaining;
    }

    pub fn concentration(&self) -> f32 {
        self.concentration
    }

    /// Dissolved mass plus everything cleared so far.
    pub fn total_mass(&self) -> f32 {
        self.concentration * self.volume_ml + self.cumulative_cleared
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            concentration: self.concentration,
            cumulative_cleared: self.cumulative_cleared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_influx_dilutes_into_volume() {
        let mut p = TransportPool::new(300.0, 5000.0, 100.0);
        p.influx(500.0);
        assert!((p.concentration() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_decay_halves_at_half_life() {
        let mut p = TransportPool::new(300.0, 1000.0, 100.0);
        p.influx(1000.0);
        let c0 = p.concentration();
        p.decay(300.0);
        assert!((p.concentration() - c0 / 2.0).abs() < c0 * 1e-4);
    }

    #[test]
    fn test_mass_ledger_closed_under_decay() {
        let mut p = TransportPool::new(120.0, 2000.0, 100.0);
        p.influx(800.0);
        let before = p.total_mass();
        for _ in 0..50 {
            p.decay(60.0);
        }
        let after = p.total_mass();
        assert!((before - after).abs() < before * 1e-3);
    }

    #[test]
    fn test_cap_overflow_is_booked_as_cleared() {
        let mut p = TransportPool::new(300.0, 10.0, 1.0);
        p.influx(100.0); // would be 10 pg/ml, capped at 1
        assert_eq!(p.concentration(), 1.0);
        assert!((p.total_mass() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_negative_influx_ignored() {
        let mut p = TransportPool::new(300.0, 1000.0, 100.0);
        p.influx(-50.0);
        assert_eq!(p.concentration(), 0.0);
    }

    #[test]
    fn test_decay_monotone() {
        let mut p = TransportPool::new(300.0, 1000.0, 100.0);
        p.influx(500.0);
        let mut prev = p.concentration();
        for _ in 0..20 {
            p.decay(30.0);
            assert!(p.concentration() < prev);
            prev = p.concentration();
        }
    }
}
