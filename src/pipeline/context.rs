//! Instrument context: gesture state, backend, and visualization feed for
//! one running instrument.

use tracing::{debug, info, warn};

use crate::backend::{dispatch, BackendState, SoundBackend};
use crate::classify::{ingest, Ranking};
use crate::error::{InstrumentError, Result};
use crate::gesture::{GestureControlState, MaterialChange};
use crate::material::{self, frequency_and_waveform, SoundMapping};

use super::feed::{VisualFeed, VisualSample};

/// What one classification cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The classifier failed; state was left untouched.
    Skipped(InstrumentError),
    /// State updated, but the label has no mapping so nothing played.
    Unmapped { change: Option<MaterialChange> },
    /// State updated, but no backend is available.
    Silent { change: Option<MaterialChange> },
    /// The backend was driven for `mapping`.
    Dispatched {
        mapping: SoundMapping,
        on_off: bool,
        change: Option<MaterialChange>,
    },
    /// The backend was driven but delivery failed; the failure is dropped.
    SendFailed {
        mapping: SoundMapping,
        error: InstrumentError,
        change: Option<MaterialChange>,
    },
}

impl CycleOutcome {
    /// The material change detected this cycle, if any.
    pub fn change(&self) -> Option<&MaterialChange> {
        match self {
            CycleOutcome::Skipped(_) => None,
            CycleOutcome::Unmapped { change }
            | CycleOutcome::Silent { change }
            | CycleOutcome::Dispatched { change, .. }
            | CycleOutcome::SendFailed { change, .. } => change.as_ref(),
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self, CycleOutcome::Dispatched { .. })
    }
}

/// Everything a running instrument owns. Built at startup, mutated once per
/// classification, torn down with [`shutdown`](InstrumentContext::shutdown).
pub struct InstrumentContext {
    state: GestureControlState,
    backend: Option<Box<dyn SoundBackend>>,
    backend_state: BackendState,
    feed: VisualFeed,
    cycles: u64,
}

impl InstrumentContext {
    pub fn new(
        state: GestureControlState,
        backend: Option<Box<dyn SoundBackend>>,
        backend_state: BackendState,
    ) -> Self {
        let ctx = Self {
            state,
            backend,
            backend_state,
            feed: VisualFeed::new(),
            cycles: 0,
        };
        ctx.publish(None, None);
        ctx
    }

    pub fn state(&self) -> &GestureControlState {
        &self.state
    }

    pub fn backend_state(&self) -> &BackendState {
        &self.backend_state
    }

    /// Handle for the presentation layer.
    pub fn feed(&self) -> VisualFeed {
        self.feed.clone()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle: ingest, update state, resolve, dispatch.
    pub fn process(&mut self, outcome: Result<Ranking>) -> CycleOutcome {
        let result = match ingest(outcome) {
            Ok(result) => result,
            Err(e) => {
                warn!("classification skipped: {e}");
                return CycleOutcome::Skipped(e);
            }
        };

        self.cycles += 1;
        let change = self.state.update(&result.label, result.confidence);
        let mapping = material::resolve(&self.state.current_material);

        if let Some(ch) = &change {
            info!(
                "material changed: {} → {} (confidence {:.2}, sound {}, audio {})",
                ch.from,
                ch.to,
                self.state.confidence,
                if self.state.on_off { "ON" } else { "OFF" },
                self.backend_state.status_label(),
            );
        }
        self.publish(mapping, change.clone());

        let Some(mapping) = mapping else {
            debug!(
                "{}",
                InstrumentError::UnmappedMaterial(self.state.current_material.clone())
            );
            return CycleOutcome::Unmapped { change };
        };

        let Some(backend) = self.backend.as_mut() else {
            return CycleOutcome::Silent { change };
        };

        let on_off = self.state.on_off;
        match dispatch(backend.as_mut(), &mapping, on_off, self.state.range) {
            Ok(()) => {
                debug!(
                    note = mapping.note,
                    channel = mapping.channel,
                    on_off,
                    range = self.state.range,
                    "dispatched"
                );
                CycleOutcome::Dispatched {
                    mapping,
                    on_off,
                    change,
                }
            }
            Err(error) => {
                warn!("dispatch dropped: {error}");
                CycleOutcome::SendFailed {
                    mapping,
                    error,
                    change,
                }
            }
        }
    }

    /// Wake the audio output after a user interaction. Safe to call often.
    pub fn resume(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.resume() {
                warn!("resume failed: {e}");
            }
        }
    }

    /// Release anything still sounding.
    pub fn shutdown(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.release_all() {
                warn!("release on shutdown failed: {e}");
            }
        }
        info!(cycles = self.cycles, "instrument stopped");
    }

    fn publish(&self, mapping: Option<SoundMapping>, change: Option<MaterialChange>) {
        let label = self.state.current_material.as_str();
        let frequency = mapping
            .map(|m| frequency_and_waveform(m.note).0)
            .unwrap_or(0.0);
        let amplitude = if mapping.is_some() && self.state.on_off {
            self.state.range
        } else {
            0.0
        };

        self.feed.publish(VisualSample {
            material: label.to_string(),
            confidence: self.state.confidence,
            on_off: self.state.on_off,
            range: self.state.range,
            frequency,
            amplitude,
            color: material::color(label),
            intensity: self.state.display_intensity(),
            indicator: material::indicator(label),
            backend: self.backend_state.status_label(),
            last_change: change,
            cycle: self.cycles,
        });
    }
}
