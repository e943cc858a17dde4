//! Output backend selection: runs once at startup.
//!
//! ```text
//! Uninitialized ──MIDI ok──────────────▶ MidiReady
//!       │
//!       └─MIDI failed / no ports──┬─synth ok──▶ AudioReady
//!                                 └─synth failed─▶ Unavailable
//! ```

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{MidiBackend, SoundBackend, SynthBackend};
use crate::audio::AudioHost;
use crate::error::{InstrumentError, Result};
use crate::midi::MidiTransport;

/// Which backends startup is allowed to try.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// MIDI first, synthesizer as fallback.
    #[default]
    Auto,
    /// Skip MIDI discovery and go straight to the synthesizer.
    Synth,
}

/// Where backend selection ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendState {
    Uninitialized,
    MidiReady { port: String },
    AudioReady,
    Unavailable,
}

impl BackendState {
    /// Short status text for display.
    pub fn status_label(&self) -> &'static str {
        match self {
            BackendState::MidiReady { .. } => "MIDI",
            BackendState::AudioReady => "Synth",
            BackendState::Uninitialized | BackendState::Unavailable => "Not Ready",
        }
    }

    /// Whether sound can be dispatched.
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            BackendState::MidiReady { .. } | BackendState::AudioReady
        )
    }
}

/// One-shot backend selector.
#[derive(Debug)]
pub struct BackendSelector {
    state: BackendState,
}

impl BackendSelector {
    pub fn new() -> Self {
        Self {
            state: BackendState::Uninitialized,
        }
    }

    pub fn state(&self) -> &BackendState {
        &self.state
    }

    /// Pick the backend.
    ///
    /// `open_midi` should fail with [`InstrumentError::NoMidiPorts`] when
    /// discovery finds nothing; any MIDI failure falls through to
    /// `open_audio`. Returns `Ok(None)` when nothing could be opened; the
    /// instrument then runs silent. A second call is rejected with
    /// [`InstrumentError::AlreadySelected`].
    pub fn select<M, A>(
        &mut self,
        preference: BackendPreference,
        open_midi: M,
        open_audio: A,
    ) -> Result<Option<Box<dyn SoundBackend>>>
    where
        M: FnOnce() -> Result<Box<dyn MidiTransport>>,
        A: FnOnce() -> Result<Box<dyn AudioHost>>,
    {
        if self.state != BackendState::Uninitialized {
            return Err(InstrumentError::AlreadySelected);
        }

        if preference == BackendPreference::Auto {
            match open_midi() {
                Ok(transport) => {
                    let port = transport.port_name().to_string();
                    info!(%port, "using MIDI output");
                    self.state = BackendState::MidiReady { port };
                    return Ok(Some(Box::new(MidiBackend::new(transport))));
                }
                Err(InstrumentError::NoMidiPorts) => {
                    info!("no MIDI outputs found, falling back to synthesizer");
                }
                Err(e) => {
                    warn!("MIDI initialization failed: {e}, falling back to synthesizer");
                }
            }
        }

        match open_audio() {
            Ok(host) => {
                info!("using built-in synthesizer");
                self.state = BackendState::AudioReady;
                Ok(Some(Box::new(SynthBackend::new(host))))
            }
            Err(e) => {
                error!("synthesizer initialization failed: {e}");
                error!("{}, running silent", InstrumentError::NoOutputBackend);
                self.state = BackendState::Unavailable;
                Ok(None)
            }
        }
    }
}

impl Default for BackendSelector {
    fn default() -> Self {
        Self::new()
    }
}
