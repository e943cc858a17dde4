//! Material profiles: the one table every consumer reads from.
//!
//! Each label the classifier knows maps to a single [`MaterialProfile`]
//! carrying its MIDI mapping, synth voice, and display color. Acoustic
//! parameters are looked up by note number, not label, so renaming a label
//! only touches [`PROFILES`].

use serde::Serialize;

use crate::synth::Waveform;

/// Label the classifier emits when it sees nothing it recognizes.
pub const UNKNOWN_LABEL: &str = "unknown";
/// Label for all three materials in frame together.
pub const COMBINED_LABEL: &str = "wood+coral+stone";
/// Note number that selects the arpeggio instead of a single burst.
pub const COMBINED_NOTE: u8 = 84;

/// Fallback acoustic parameters for a note with no table entry (A4).
pub const DEFAULT_FREQUENCY_HZ: f64 = 440.0;
pub const DEFAULT_WAVEFORM: Waveform = Waveform::Sine;
pub const DEFAULT_COLOR: [u8; 3] = [255, 255, 255];

/// MIDI side of a material: what to play and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoundMapping {
    /// MIDI note number (0–127).
    pub note: u8,
    /// MIDI channel, 1-based (1–16).
    pub channel: u8,
    /// Controller number for the modulation CC (0–127).
    pub control_index: u8,
}

impl SoundMapping {
    /// Whether this mapping plays the combined-material arpeggio.
    pub fn is_combined(&self) -> bool {
        self.note == COMBINED_NOTE
    }
}

/// How the presentation layer draws the material indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Filled,
    Outline,
}

/// Everything the instrument knows about one material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialProfile {
    pub label: &'static str,
    pub mapping: SoundMapping,
    pub frequency_hz: f64,
    pub waveform: Waveform,
    pub color: [u8; 3],
    pub indicator: Indicator,
}

/// The fixed material table.
pub const PROFILES: [MaterialProfile; 4] = [
    MaterialProfile {
        label: "coral",
        mapping: SoundMapping {
            note: 72,
            channel: 1,
            control_index: 1,
        },
        frequency_hz: 523.25,
        waveform: Waveform::Sine,
        color: [255, 255, 255],
        indicator: Indicator::Filled,
    },
    MaterialProfile {
        label: "stone",
        mapping: SoundMapping {
            note: 48,
            channel: 2,
            control_index: 2,
        },
        frequency_hz: 130.81,
        waveform: Waveform::Sawtooth,
        color: [150, 150, 150],
        indicator: Indicator::Filled,
    },
    MaterialProfile {
        label: "wood",
        mapping: SoundMapping {
            note: 60,
            channel: 3,
            control_index: 3,
        },
        frequency_hz: 261.63,
        waveform: Waveform::Triangle,
        color: [139, 69, 19],
        indicator: Indicator::Filled,
    },
    MaterialProfile {
        label: COMBINED_LABEL,
        mapping: SoundMapping {
            note: COMBINED_NOTE,
            channel: 4,
            control_index: 4,
        },
        frequency_hz: 1046.50,
        waveform: Waveform::Square,
        color: [255, 215, 0],
        indicator: Indicator::Outline,
    },
];

/// Look up the full profile for an exact label.
pub fn profile(label: &str) -> Option<&'static MaterialProfile> {
    PROFILES.iter().find(|p| p.label == label)
}

/// Look up the sound mapping for an exact label. Unknown labels resolve to
/// `None` and play nothing.
pub fn resolve(label: &str) -> Option<SoundMapping> {
    profile(label).map(|p| p.mapping)
}

/// Acoustic parameters for a note number, independent of label text.
pub fn frequency_and_waveform(note: u8) -> (f64, Waveform) {
    PROFILES
        .iter()
        .find(|p| p.mapping.note == note)
        .map(|p| (p.frequency_hz, p.waveform))
        .unwrap_or((DEFAULT_FREQUENCY_HZ, DEFAULT_WAVEFORM))
}

/// Display color for a label; unknown labels are drawn white.
pub fn color(label: &str) -> [u8; 3] {
    profile(label).map(|p| p.color).unwrap_or(DEFAULT_COLOR)
}

/// Indicator style for a label.
pub fn indicator(label: &str) -> Indicator {
    profile(label)
        .map(|p| p.indicator)
        .unwrap_or(Indicator::Filled)
}

/// All labels with a profile, in table order.
pub fn labels() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|p| p.label)
}
