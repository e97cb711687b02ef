//! Configuration surface for the simulation core.
//!
//! Loaded once at process start and immutable afterwards; every engine takes
//! the relevant section by reference at construction. Defaults are tuned so
//! the system runs sensibly with no config file at all.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::state::{Region, Substance};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SomaConfig {
    pub kinetics: KineticsConfig,
    pub integrator: IntegratorConfig,
    pub retrieval: RetrievalConfig,
}

impl SomaConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let config: SomaConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                Self::default()
            }
        }
    }
}

// ============================================================================
// Kinetics
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KineticsConfig {
    /// Distribution volume the secreted mass dissolves into (ml)
    pub distribution_volume_ml: f32,

    /// Hard ceiling on any pool concentration (pg/ml)
    pub concentration_cap: f32,

    /// Stimulus intensity above which the reflex fast path fires
    pub reflex_threshold: f32,

    /// Activation added per unit of over-threshold intensity
    pub reflex_gain: f32,

    /// Per-substance production and clearance parameters
    pub substances: BTreeMap<Substance, SubstanceParams>,

    /// Receptor wiring: one entry per receptor unit
    pub receptors: Vec<ReceptorParams>,
}

impl Default for KineticsConfig {
    fn default() -> Self {
        let mut substances = BTreeMap::new();
        substances.insert(
            Substance::Adrenaline,
            SubstanceParams {
                half_life_secs: 180.0,
                max_output_rate: 12.0,
                max_capacity: 40_000.0,
                latency_secs: 5.0,
                drive: DriveWeights {
                    intensity: 1.0,
                    arousal: 0.6,
                    valence_pos: 0.0,
                    valence_neg: 0.8,
                },
            },
        );
        substances.insert(
            Substance::Cortisol,
            SubstanceParams {
                half_life_secs: 3600.0,
                max_output_rate: 6.0,
                max_capacity: 60_000.0,
                latency_secs: 30.0,
                drive: DriveWeights {
                    intensity: 0.5,
                    arousal: 0.2,
                    valence_pos: 0.0,
                    valence_neg: 1.0,
                },
            },
        );
        substances.insert(
            Substance::Dopamine,
            SubstanceParams {
                half_life_secs: 600.0,
                max_output_rate: 10.0,
                max_capacity: 50_000.0,
                latency_secs: 8.0,
                drive: DriveWeights {
                    intensity: 0.4,
                    arousal: 0.5,
                    valence_pos: 1.0,
                    valence_neg: 0.0,
                },
            },
        );
        substances.insert(
            Substance::Serotonin,
            SubstanceParams {
                half_life_secs: 1800.0,
                max_output_rate: 5.0,
                max_capacity: 50_000.0,
                latency_secs: 20.0,
                drive: DriveWeights {
                    intensity: 0.1,
                    arousal: 0.0,
                    valence_pos: 0.8,
                    valence_neg: 0.0,
                },
            },
        );
        substances.insert(
            Substance::Oxytocin,
            SubstanceParams {
                half_life_secs: 900.0,
                max_output_rate: 7.0,
                max_capacity: 45_000.0,
                latency_secs: 12.0,
                drive: DriveWeights {
                    intensity: 0.2,
                    arousal: 0.1,
                    valence_pos: 0.9,
                    valence_neg: 0.0,
                },
            },
        );

        let receptors = vec![
            ReceptorParams {
                region: Region::Amygdala,
                substance: Substance::Adrenaline,
                kd: 2.0,
                max_density: 1.0,
                efficacy: 1.0,
            },
            ReceptorParams {
                region: Region::Amygdala,
                substance: Substance::Cortisol,
                kd: 5.0,
                max_density: 1.0,
                efficacy: 0.9,
            },
            ReceptorParams {
                region: Region::Prefrontal,
                substance: Substance::Dopamine,
                kd: 3.0,
                max_density: 1.0,
                efficacy: 1.0,
            },
            ReceptorParams {
                region: Region::Prefrontal,
                substance: Substance::Serotonin,
                kd: 4.0,
                max_density: 1.0,
                efficacy: 0.8,
            },
            ReceptorParams {
                region: Region::Hypothalamus,
                substance: Substance::Cortisol,
                kd: 4.0,
                max_density: 1.0,
                efficacy: 0.9,
            },
            ReceptorParams {
                region: Region::Hypothalamus,
                substance: Substance::Oxytocin,
                kd: 2.5,
                max_density: 1.0,
                efficacy: 1.0,
            },
            ReceptorParams {
                region: Region::Brainstem,
                substance: Substance::Adrenaline,
                kd: 1.5,
                max_density: 1.0,
                efficacy: 1.0,
            },
            ReceptorParams {
                region: Region::Brainstem,
                substance: Substance::Serotonin,
                kd: 3.5,
                max_density: 1.0,
                efficacy: 0.7,
            },
        ];

        Self {
            distribution_volume_ml: 5000.0,
            concentration_cap: 100.0,
            reflex_threshold: 0.8,
            reflex_gain: 0.6,
            substances,
            receptors,
        }
    }
}

/// Production and clearance parameters for one substance.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SubstanceParams {
    /// Pool clearance half-life (seconds)
    pub half_life_secs: f32,

    /// Maximum secretion rate (pg/s) at full drive and adaptation
    pub max_output_rate: f32,

    /// Gland inventory capacity (pg); inventory starts full and only drains
    pub max_capacity: f32,

    /// Time constant for drive decay (seconds)
    pub latency_secs: f32,

    pub drive: DriveWeights,
}

/// How a stimulus feeds this substance's drive accumulator.
/// `valence_pos` applies to positive valence, `valence_neg` to the magnitude
/// of negative valence; all weights are non-negative.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DriveWeights {
    pub intensity: f32,
    pub arousal: f32,
    pub valence_pos: f32,
    pub valence_neg: f32,
}

/// Wiring for one receptor unit.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReceptorParams {
    pub region: Region,
    pub substance: Substance,

    /// Half-saturation concentration (pg/ml)
    pub kd: f32,

    /// Receptor density scale in [0, 1]
    pub max_density: f32,

    /// Signal transduction efficiency in [0, 1]
    pub efficacy: f32,
}

// ============================================================================
// Autonomic integrator
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Smoothing factor: new = alpha * raw + (1 - alpha) * old
    pub alpha: f32,

    /// Per-region contribution to the activating channel
    pub sympathetic_weights: BTreeMap<Region, f32>,

    /// Per-region contribution to the calming channel
    pub parasympathetic_weights: BTreeMap<Region, f32>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        let mut sympathetic_weights = BTreeMap::new();
        sympathetic_weights.insert(Region::Amygdala, 0.5);
        sympathetic_weights.insert(Region::Brainstem, 0.4);
        sympathetic_weights.insert(Region::Hypothalamus, 0.2);
        sympathetic_weights.insert(Region::Prefrontal, 0.1);

        let mut parasympathetic_weights = BTreeMap::new();
        parasympathetic_weights.insert(Region::Prefrontal, 0.5);
        parasympathetic_weights.insert(Region::Hypothalamus, 0.4);
        parasympathetic_weights.insert(Region::Brainstem, 0.2);
        parasympathetic_weights.insert(Region::Amygdala, 0.05);

        Self {
            alpha: 0.2,
            sympathetic_weights,
            parasympathetic_weights,
        }
    }
}

// ============================================================================
// Retrieval
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Half-life (days) for the shared temporal decay multiplier
    pub recency_halflife_days: f32,

    pub sequence: StreamParams,
    pub salience: StreamParams,
    pub sensory: StreamParams,
    pub pattern: StreamParams,
    pub state: StreamParams,
    pub recency: StreamParams,
    pub reflection: StreamParams,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            recency_halflife_days: 30.0,
            sequence: StreamParams::new(3, 0.0),
            salience: StreamParams::new(3, 0.70),
            sensory: StreamParams::new(3, 0.60),
            pattern: StreamParams::new(3, 0.0),
            state: StreamParams::new(3, 0.70),
            recency: StreamParams::new(3, 0.0),
            reflection: StreamParams::new(3, 0.0),
        }
    }
}

/// Per-stream selection parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct StreamParams {
    /// How many candidates this stream contributes
    pub top_k: usize,

    /// Minimum raw score a candidate must reach
    pub threshold: f32,
}

impl StreamParams {
    pub fn new(top_k: usize, threshold: f32) -> Self {
        Self { top_k, threshold }
    }
}

impl Default for StreamParams {
    fn default() -> Self {
        Self::new(3, 0.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = SomaConfig::default();
        assert_eq!(cfg.kinetics.reflex_threshold, 0.8);
        assert_eq!(cfg.kinetics.substances.len(), 5);
        assert_eq!(cfg.integrator.alpha, 0.2);
        assert_eq!(cfg.retrieval.recency_halflife_days, 30.0);
        assert_eq!(cfg.retrieval.state.threshold, 0.70);
        assert_eq!(cfg.retrieval.state.top_k, 3);
    }

    #[test]
    fn test_every_receptor_references_configured_substance() {
        let cfg = KineticsConfig::default();
        for r in &cfg.receptors {
            assert!(
                cfg.substances.contains_key(&r.substance),
                "receptor in {:?} binds unconfigured {:?}",
                r.region,
                r.substance
            );
        }
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[integrator]
alpha = 0.5

[retrieval]
recency_halflife_days = 7.0
"#;
        let cfg: SomaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.integrator.alpha, 0.5);
        assert_eq!(cfg.retrieval.recency_halflife_days, 7.0);
        // Defaults for unspecified fields
        assert_eq!(cfg.kinetics.reflex_threshold, 0.8);
        assert_eq!(cfg.retrieval.salience.threshold, 0.70);
    }

    #[test]
    fn test_parse_substance_override() {
        let toml_str = r#"
[kinetics]
reflex_threshold = 0.9

[kinetics.substances.adrenaline]
half_life_secs = 60.0
max_output_rate = 20.0
max_capacity = 10000.0
latency_secs = 2.0
drive = { intensity = 1.0, arousal = 0.5, valence_pos = 0.0, valence_neg = 1.0 }
"#;
        let cfg: SomaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.kinetics.reflex_threshold, 0.9);
        // A substances table in the file replaces the default table wholesale
        assert_eq!(cfg.kinetics.substances.len(), 1);
        let adr = &cfg.kinetics.substances[&Substance::Adrenaline];
        assert_eq!(adr.half_life_secs, 60.0);
        assert_eq!(adr.drive.valence_neg, 1.0);
    }

    #[test]
    fn test_parse_stream_params() {
        let toml_str = r#"
[retrieval.recency]
top_k = 10
"#;
        let cfg: SomaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.retrieval.recency.top_k, 10);
        assert_eq!(cfg.retrieval.recency.threshold, 0.0);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let cfg = SomaConfig::load_or_default("/nonexistent/soma.toml");
        assert_eq!(cfg.integrator.alpha, 0.2);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[kinetics]\nreflex_gain = 0.4\n\n[retrieval.state]\nthreshold = 0.5"
        )
        .unwrap();

        let cfg = SomaConfig::load(file.path()).unwrap();
        assert_eq!(cfg.kinetics.reflex_gain, 0.4);
        assert_eq!(cfg.retrieval.state.threshold, 0.5);
        assert_eq!(cfg.retrieval.state.top_k, 3);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [").unwrap();
        assert!(SomaConfig::load(file.path()).is_err());
    }
}
