//! Synthesized sound: voices, gain curves, and the two sound shapes the
//! instrument plays: a short single-voice burst and the four-beat arpeggio.

pub mod arpeggio;
pub mod envelope;
pub mod oscillator;
pub mod voice;

pub use envelope::{GainAutomation, GainPoint};
pub use oscillator::Waveform;
pub use voice::Voice;

/// Length of a single-voice burst in seconds.
pub const BURST_SECS: f64 = 0.1;
/// Ceiling on burst gain, as a fraction of full scale.
pub const BURST_GAIN_SCALE: f64 = 0.3;

/// Build a fire-and-forget burst: constant gain `range * 0.3` from `now`
/// until `now + 0.1`.
pub fn burst(frequency: f64, waveform: Waveform, range: f32, now: f64) -> Voice {
    let gain = range as f64 * BURST_GAIN_SCALE;
    Voice::new(frequency, waveform)
        .schedule_gain([GainPoint::Set {
            value: gain,
            at: now,
        }])
        .start(now)
        .stop(now + BURST_SECS)
}
