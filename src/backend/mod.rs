//! Sound backends: one interface over MIDI output and the built-in synth.
//!
//! The pipeline only ever talks to a [`SoundBackend`]; which implementation
//! sits behind it is decided once at startup by [`BackendSelector`].

pub mod midi;
pub mod selector;
pub mod synth;

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::material::SoundMapping;

pub use self::midi::MidiBackend;
pub use self::selector::{BackendPreference, BackendSelector, BackendState};
pub use self::synth::SynthBackend;

/// Which kind of backend is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackendKind {
    Midi,
    Synth,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Midi => f.write_str("MIDI"),
            BackendKind::Synth => f.write_str("Synth"),
        }
    }
}

/// Uniform note on/off + modulation interface.
pub trait SoundBackend {
    fn kind(&self) -> BackendKind;

    /// Start sound for `mapping` at intensity `range` in `[0, 1]`.
    fn note_on(&mut self, mapping: &SoundMapping, range: f32) -> Result<()>;

    /// Stop sound for `mapping`.
    fn note_off(&mut self, mapping: &SoundMapping) -> Result<()>;

    /// Wake the output after a user interaction. Idempotent.
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release anything still sounding. Called once at teardown.
    fn release_all(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Route one cycle's control signal to the backend.
pub fn dispatch(
    backend: &mut dyn SoundBackend,
    mapping: &SoundMapping,
    on_off: bool,
    range: f32,
) -> Result<()> {
    if on_off {
        backend.note_on(mapping, range)
    } else {
        backend.note_off(mapping)
    }
}
