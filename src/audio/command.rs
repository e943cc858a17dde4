//! Commands sent from the pipeline thread to the audio thread via ring buffer.

use crate::synth::Voice;

/// Commands sent from the pipeline thread to the audio thread via ring buffer.
#[derive(Debug)]
pub enum AudioCommand {
    /// Add a scheduled voice. It sounds between its start and stop times on
    /// the audio clock and is dropped once finished.
    Play(Voice),

    /// Set master volume (0.0 to 1.0).
    SetVolume(f32),
}
