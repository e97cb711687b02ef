//! Producer units ("glands"): hormone mass production against a finite
//! inventory, with fatigue and a Hill-Langmuir drive response.
//!
//! A gland never refills. Inventory starts at capacity and only drains, so
//! the system-wide mass ledger stays closed; at default rates it takes days
//! of sustained maximal stimulation to exhaust one.

use soma_core::config::SubstanceParams;
use soma_core::state::{sanitize_f32, GlandSnapshot};

/// Hill-Langmuir midpoint: drive level at half-maximal secretion intensity.
const HILL_K: f32 = 2.5;
/// Hill slope.
const HILL_N: f32 = 3.0;

/// Drive below this is snapped to zero to keep decay from producing denormals.
const DRIVE_FLOOR: f32 = 1e-4;
const DRIVE_CAP: f32 = 10.0;

const ADAPTATION_MIN: f32 = 0.1;
const ADAPTATION_MAX: f32 = 1.0;

/// One gland. Owns inventory, adaptation and the drive accumulator.
#[derive(Debug, Clone)]
pub struct ProducerUnit {
    params: SubstanceParams,
    inventory_mass: f32,
    adaptation: f32,
    drive: f32,
    last_flux: f32,
}

impl ProducerUnit {
    pub fn new(params: SubstanceParams) -> Self {
        Self {
            params,
            inventory_mass: params.max_capacity.max(0.0),
            adaptation: ADAPTATION_MAX,
            drive: 0.0,
            last_flux: 0.0,
        }
    }

    /// Maps drive level to secretion intensity in [0, 1).
    fn hill_response(x: f32) -> f32 {
        if x <= 0.0 {
            return 0.0;
        }
        let xn = x.powf(HILL_N);
        xn / (HILL_K.powf(HILL_N) + xn)
    }

    /// Tonic secretion over `dt`. `drive_input` is the stimulus-conditioned
    /// modulation for this substance (non-negative). Returns released mass.
    ///
    /// Under stimulus the gland desensitizes (adaptation drops) while drive
    /// accumulates; at rest adaptation recovers. Secretion is bounded by
    /// `adaptation * max_output_rate * dt` and truncated at the remaining
    /// inventory, never negative.
    pub fn step(&mut self, drive_input: f32, dt: f32) -> f32 {
        self.normalize();
        let input = sanitize_f32(drive_input, 0.0).max(0.0);

        if input > 0.05 {
            self.adaptation = (self.adaptation - input * 0.05 * dt).max(ADAPTATION_MIN);
            self.drive = (self.drive + input * 2.0 * dt).min(DRIVE_CAP);
        } else {
            self.adaptation = (self.adaptation + 0.02 * dt).min(ADAPTATION_MAX);
        }

        let intensity = Self::hill_response(self.drive);
        let potential = self.params.max_output_rate * intensity * self.adaptation * dt;
        let released = potential.min(self.inventory_mass).max(0.0);

        self.inventory_mass -= released;
        self.last_flux = released;

        // Latency: drive relaxes toward zero between stimuli
        let tau = self.params.latency_secs.max(1.0);
        self.drive *= (-dt / tau).exp();
        if self.drive < DRIVE_FLOOR {
            self.drive = 0.0;
        }

        released
    }

    pub fn snapshot(&self) -> GlandSnapshot {
        GlandSnapshot {
            inventory_mass: self.inventory_mass,
            max_capacity: self.params.max_capacity,
            adaptation: self.adaptation,
            drive: self.drive,
            last_flux: self.last_flux,
        }
    }

    pub fn inventory_mass(&self) -> f32 {
        self.inventory_mass
    }

    fn normalize(&mut self) {
        let cap = self.params.max_capacity.max(0.0);
        self.inventory_mass = sanitize_f32(self.inventory_mass, cap).clamp(0.0, cap);
        self.adaptation =
            sanitize_f32(self.adaptation, ADAPTATION_MAX).clamp(ADAPTATION_MIN, ADAPTATION_MAX);
        self.drive = sanitize_f32(self.drive, 0.0).clamp(0.0, DRIVE_CAP);
    }
}
