//! Internal state snapshot types.
//!
//! The kinetics pipeline is a three-stage chain per substance:
//! gland (production, finite inventory) → transport pool (concentration with
//! exponential clearance) → receptors (saturating binding per brain region).
//! [`InternalStateVector`] is the versioned snapshot of all three stages at
//! one step; it is produced by the kinetics engine and read-only everywhere
//! else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Guard against NaN and Infinity in state values.
/// If the value is NaN or Inf, replace with the provided fallback.
#[inline]
pub fn sanitize_f32(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in state, resetting to fallback {}", fallback);
        fallback
    }
}

// =============================================================================
// Substances and regions
// =============================================================================

/// The five simulated hormone-like substances.
///
/// `Ord` matters: all per-substance maps are `BTreeMap` keyed by this enum so
/// that iteration order (and thus [`InternalStateVector::flatten`]) is fixed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Substance {
    Adrenaline,
    Cortisol,
    Dopamine,
    Serotonin,
    Oxytocin,
}

impl Substance {
    pub const ALL: [Substance; 5] = [
        Substance::Adrenaline,
        Substance::Cortisol,
        Substance::Dopamine,
        Substance::Serotonin,
        Substance::Oxytocin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Substance::Adrenaline => "adrenaline",
            Substance::Cortisol => "cortisol",
            Substance::Dopamine => "dopamine",
            Substance::Serotonin => "serotonin",
            Substance::Oxytocin => "oxytocin",
        }
    }
}

/// Fixed receptor regions. Each region hosts one or more receptor units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Prefrontal,
    Amygdala,
    Hypothalamus,
    Brainstem,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Prefrontal,
        Region::Amygdala,
        Region::Hypothalamus,
        Region::Brainstem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Prefrontal => "prefrontal",
            Region::Amygdala => "amygdala",
            Region::Hypothalamus => "hypothalamus",
            Region::Brainstem => "brainstem",
        }
    }
}

// =============================================================================
// Per-stage snapshots
// =============================================================================

/// Gland state at one step. Mass unit is picograms throughout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlandSnapshot {
    /// Remaining producible mass, in [0, max_capacity]
    pub inventory_mass: f32,

    /// Capacity the inventory started at
    pub max_capacity: f32,

    /// Fatigue/recovery factor in [0.1, 1.0]; scales secretion
    pub adaptation: f32,

    /// Accumulated secretion drive, decays with the gland's latency constant
    pub drive: f32,

    /// Mass released on the most recent step
    pub last_flux: f32,
}

/// Inventory-based gland condition, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlandStatus {
    Active,
    Fatigued,
    Exhausted,
}

impl GlandSnapshot {
    /// Fraction of capacity still available.
    pub fn inventory_fraction(&self) -> f32 {
        if self.max_capacity <= 0.0 {
            return 0.0;
        }
        (self.inventory_mass / self.max_capacity).clamp(0.0, 1.0)
    }

    /// Classify by remaining inventory: below 5% exhausted, below 20% fatigued.
    pub fn status(&self) -> GlandStatus {
        let pct = self.inventory_fraction();
        if pct <= 0.05 {
            GlandStatus::Exhausted
        } else if pct <= 0.20 {
            GlandStatus::Fatigued
        } else {
            GlandStatus::Active
        }
    }
}

/// Transport pool state for one substance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Current concentration (pg/ml), never negative
    pub concentration: f32,

    /// Total mass removed by clearance since process start.
    /// Part of the conservation ledger: inventory + pool mass + cleared
    /// is constant.
    pub cumulative_cleared: f32,
}

/// One receptor unit's activation within a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceptorSnapshot {
    pub substance: Substance,

    /// Bound-fraction signal in [0, 1]
    pub activation: f32,
}

// =============================================================================
// Aggregate state
// =============================================================================

/// Full numeric snapshot of the simulated internal state at one step.
///
/// Mutated exclusively by the kinetics engine's `advance()`; every other
/// component takes it by shared reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InternalStateVector {
    /// Monotonically increasing step counter
    pub step_index: u64,

    pub glands: BTreeMap<Substance, GlandSnapshot>,
    pub pools: BTreeMap<Substance, PoolSnapshot>,
    pub regions: BTreeMap<Region, Vec<ReceptorSnapshot>>,
}

impl InternalStateVector {
    /// Mean receptor activation within a region; 0.0 for an absent region.
    pub fn region_activation(&self, region: Region) -> f32 {
        match self.regions.get(&region) {
            Some(units) if !units.is_empty() => {
                units.iter().map(|r| r.activation).sum::<f32>() / units.len() as f32
            }
            _ => 0.0,
        }
    }

    /// Project the snapshot into a fixed-order numeric vector for similarity
    /// matching. Order is stable across runs: receptor activations in
    /// (region, position) order, then pool concentrations squashed to [0, 1)
    /// via c/(c+1), then per-gland inventory fraction and adaptation.
    ///
    /// Two snapshots built from the same configuration always flatten to
    /// vectors of the same length.
    pub fn flatten(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for units in self.regions.values() {
            for r in units {
                out.push(r.activation);
            }
        }
        for pool in self.pools.values() {
            let c = pool.concentration.max(0.0);
            out.push(c / (c + 1.0));
        }
        for gland in self.glands.values() {
            out.push(gland.inventory_fraction());
            out.push(gland.adaptation);
        }
        out
    }
}

// =============================================================================
// Autonomic balance
// =============================================================================

/// Two opposing smoothed channels summarizing receptor activation.
///
/// The only cross-turn state besides [`InternalStateVector`]; owned and
/// mutated by the autonomic integrator alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutonomicBalance {
    /// Activating channel in [0, 1]
    pub sympathetic: f32,

    /// Calming channel in [0, 1]
    pub parasympathetic: f32,
}

impl Default for AutonomicBalance {
    fn default() -> Self {
        Self {
            sympathetic: 0.5,
            parasympathetic: 0.5,
        }
    }
}

impl AutonomicBalance {
    /// Clamp both channels, recovering NaN to the resting default.
    pub fn normalize(&mut self) {
        self.sympathetic = sanitize_f32(self.sympathetic, 0.5).clamp(0.0, 1.0);
        self.parasympathetic = sanitize_f32(self.parasympathetic, 0.5).clamp(0.0, 1.0);
    }

    /// Net arousal direction (-1 = fully calming, +1 = fully activating).
    pub fn net_drive(&self) -> f32 {
        self.sympathetic - self.parasympathetic
    }
}
