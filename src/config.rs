//! Instrument configuration loaded from ~/.gestural/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::BackendPreference;
use crate::error::Result;
use crate::gesture::DEFAULT_CHANGE_THRESHOLD;

/// Settings for the built-in classification simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// RNG seed; the same seed replays the same material walk.
    pub seed: u64,
    /// Pause between simulated classifications, standing in for model latency.
    pub interval_ms: u64,
    /// Relative weight of the "unknown" label against each material.
    pub unknown_weight: u32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            interval_ms: 120,
            unknown_weight: 1,
        }
    }
}

/// Instrument configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    pub backend: BackendPreference,
    /// Preferred MIDI output (substring match). None = first available.
    pub midi_device: Option<String>,
    /// Master volume for the synthesizer (0.0–1.0).
    pub volume: f32,
    pub material_change_threshold: f32,
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,
    pub simulator: SimulatorConfig,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            midi_device: None,
            volume: 1.0,
            material_change_threshold: DEFAULT_CHANGE_THRESHOLD,
            log_level: "info".to_string(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl InstrumentConfig {
    /// Standard config path (~/.gestural/config.yaml).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".gestural").join("config.yaml"))
    }

    /// Load config from the standard path.
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load() -> Option<Self> {
        let path = Self::default_path()?;
        let content = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&content).ok()
    }

    /// Load config from an explicit path; errors are reported.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
