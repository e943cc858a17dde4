//! Oscillator primitives: waveform shapes for synthesized voices.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Available oscillator shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Sawtooth,
    Triangle,
    Square,
}

impl Waveform {
    /// Generate a single sample at `phase` in `[0.0, 1.0)`.
    ///
    /// Returns a value in `[-1.0, 1.0]`.
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (phase * 2.0 * PI).sin(),
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
        }
    }

    /// Lowercase name, as used in config files and logs.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Advance a phase accumulator by one sample, wrapping into `[0.0, 1.0)`.
#[inline]
pub fn advance_phase(phase: f64, frequency: f64, sample_rate: u32) -> f64 {
    (phase + frequency / sample_rate as f64).fract()
}
