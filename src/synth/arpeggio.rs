//! Arpeggiator for the combined material: a fixed four-beat C-major figure.
//!
//! All four voices are computed against one time origin and scheduled at
//! once; nothing chains off a previous voice finishing.

use super::envelope::GainPoint;
use super::oscillator::Waveform;
use super::voice::Voice;

/// Root of the figure (C4).
pub const ROOT_HZ: f64 = 261.63;
/// Root, major third, perfect fifth, octave.
pub const RATIOS: [f64; 4] = [1.0, 1.25, 1.5, 2.0];
pub const WAVEFORMS: [Waveform; 4] = [
    Waveform::Triangle,
    Waveform::Sine,
    Waveform::Triangle,
    Waveform::Sine,
];
/// Seconds per beat.
pub const BEAT_SECS: f64 = 0.2;
/// Linear attack length in seconds.
pub const ATTACK_SECS: f64 = 0.01;
/// Decay length as a fraction of the beat.
pub const DECAY_FRACTION: f64 = 0.8;
/// Exponential ramps cannot reach zero; decay lands here.
pub const DECAY_FLOOR: f64 = 0.001;
/// Base volume as a fraction of the control range.
pub const VOLUME_SCALE: f64 = 0.1;

/// One step of the figure, fully resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArpBeat {
    pub index: usize,
    pub frequency: f64,
    pub waveform: Waveform,
    pub start: f64,
    pub peak_gain: f64,
}

impl ArpBeat {
    /// Time at which the decay reaches the floor and the oscillator stops.
    pub fn end(&self) -> f64 {
        self.start + BEAT_SECS * DECAY_FRACTION
    }

    /// Build the scheduled voice for this beat.
    pub fn voice(&self) -> Voice {
        Voice::new(self.frequency, self.waveform)
            .schedule_gain([
                GainPoint::Set {
                    value: 0.0,
                    at: self.start,
                },
                GainPoint::LinearRamp {
                    value: self.peak_gain,
                    end: self.start + ATTACK_SECS,
                },
                GainPoint::ExponentialRamp {
                    value: DECAY_FLOOR,
                    end: self.end(),
                },
            ])
            .start(self.start)
            .stop(self.end())
    }
}

/// Resolve the four beats for a control `range` starting at `origin`.
pub fn beats(origin: f64, range: f32) -> [ArpBeat; 4] {
    let volume = range as f64 * VOLUME_SCALE;
    std::array::from_fn(|index| ArpBeat {
        index,
        frequency: ROOT_HZ * RATIOS[index],
        waveform: WAVEFORMS[index],
        start: origin + index as f64 * BEAT_SECS,
        peak_gain: volume * (0.8 - index as f64 * 0.1),
    })
}

/// Resolve the four beats straight into voices.
pub fn voices(origin: f64, range: f32) -> Vec<Voice> {
    beats(origin, range).iter().map(ArpBeat::voice).collect()
}
