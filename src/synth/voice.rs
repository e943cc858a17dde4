//! Voice: one oscillator and its gain automation, scheduled on the audio clock.

use super::envelope::{GainAutomation, GainPoint};
use super::oscillator::Waveform;

/// A single oscillator+gain pair.
///
/// Built with chained calls and handed to an
/// [`AudioHost`](crate::audio::AudioHost) in one piece; once scheduled it
/// cannot be cancelled.
///
/// ```
/// use gestural::synth::{GainPoint, Voice, Waveform};
///
/// let voice = Voice::new(261.63, Waveform::Triangle)
///     .schedule_gain([GainPoint::Set { value: 0.3, at: 0.0 }])
///     .start(0.0)
///     .stop(0.1);
/// assert!((voice.duration() - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    frequency: f64,
    waveform: Waveform,
    gain: GainAutomation,
    start: f64,
    stop: f64,
}

impl Voice {
    /// Create a voice at `frequency` Hz. Unscheduled voices start at 0 and
    /// never stop.
    pub fn new(frequency: f64, waveform: Waveform) -> Self {
        Self {
            frequency,
            waveform,
            gain: GainAutomation::default(),
            start: 0.0,
            stop: f64::INFINITY,
        }
    }

    /// Add gain automation points.
    pub fn schedule_gain(mut self, points: impl IntoIterator<Item = GainPoint>) -> Self {
        for point in points {
            self.gain.push(point);
        }
        self
    }

    /// Start the oscillator at absolute time `at`.
    pub fn start(mut self, at: f64) -> Self {
        self.start = at;
        self
    }

    /// Stop the oscillator at absolute time `at`.
    pub fn stop(mut self, at: f64) -> Self {
        self.stop = at;
        self
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn gain(&self) -> &GainAutomation {
        &self.gain
    }

    pub fn start_time(&self) -> f64 {
        self.start
    }

    pub fn stop_time(&self) -> f64 {
        self.stop
    }

    /// Audible duration between start and stop.
    pub fn duration(&self) -> f64 {
        (self.stop - self.start).max(0.0)
    }

    /// Whether the oscillator is sounding at absolute time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start && t < self.stop
    }

    /// Whether the voice has finished by absolute time `t`.
    pub fn is_finished(&self, t: f64) -> bool {
        t >= self.stop
    }

    /// Render one sample at absolute time `t` for the given oscillator phase.
    pub fn sample(&self, t: f64, phase: f64) -> f64 {
        if !self.is_active(t) {
            return 0.0;
        }
        self.waveform.sample(phase) * self.gain.value_at(t)
    }
}
