//! Visualization feed: the latest derived sample, polled once per frame.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::gesture::MaterialChange;
use crate::material::{Indicator, DEFAULT_COLOR};

/// What the presentation layer draws for the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualSample {
    pub material: String,
    pub confidence: f32,
    pub on_off: bool,
    pub range: f32,
    /// Frequency of the material's voice, 0 when nothing is mapped.
    pub frequency: f64,
    /// Amplitude for the waveform plot: `range` while a mapped material
    /// sounds, 0 otherwise.
    pub amplitude: f32,
    pub color: [u8; 3],
    /// Confidence scaled to 0–255.
    pub intensity: u8,
    pub indicator: Indicator,
    /// "MIDI", "Synth", or "Not Ready".
    pub backend: &'static str,
    pub last_change: Option<MaterialChange>,
    pub cycle: u64,
}

impl VisualSample {
    /// Value of the waveform plot at `t` seconds.
    pub fn waveform_at(&self, t: f64) -> f64 {
        self.amplitude as f64 * (t * self.frequency * 2.0 * std::f64::consts::PI).sin()
    }
}

impl Default for VisualSample {
    fn default() -> Self {
        Self {
            material: String::new(),
            confidence: 0.0,
            on_off: false,
            range: 0.0,
            frequency: 0.0,
            amplitude: 0.0,
            color: DEFAULT_COLOR,
            intensity: 0,
            indicator: Indicator::Filled,
            backend: "Not Ready",
            last_change: None,
            cycle: 0,
        }
    }
}

/// Shared handle to the latest sample. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct VisualFeed {
    latest: Arc<Mutex<VisualSample>>,
}

impl VisualFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest sample.
    pub fn publish(&self, sample: VisualSample) {
        let mut guard = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = sample;
    }

    /// Copy of the latest sample.
    pub fn latest(&self) -> VisualSample {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
