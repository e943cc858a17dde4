//! Error types for the instrument.
//!
//! Every variant is non-fatal inside the pipeline: errors are logged and the
//! instrument keeps running in a degraded state (silent, or visual-only).

use thiserror::Error;

/// Instrument errors.
#[derive(Error, Debug)]
pub enum InstrumentError {
    /// The classifier could not be reached or started.
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// The classifier answered with an error or an unusable result.
    #[error("classifier result error: {0}")]
    ClassifierResult(String),

    /// Neither MIDI nor the synthesizer could be initialized.
    #[error("no output backend available")]
    NoOutputBackend,

    /// The label has no entry in the material table.
    #[error("unmapped material label: {0:?}")]
    UnmappedMaterial(String),

    /// A MIDI message or audio voice could not be delivered.
    #[error("send failure: {0}")]
    Send(String),

    /// MIDI subsystem initialization or connection error.
    #[error("MIDI error: {0}")]
    Midi(String),

    /// MIDI discovery succeeded but found no output ports.
    #[error("no MIDI output ports available")]
    NoMidiPorts,

    /// Audio device or stream error.
    #[error("audio error: {0}")]
    Audio(String),

    /// The output backend has already been selected.
    #[error("output backend already selected")]
    AlreadySelected,

    /// Config file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// JSON decoding error on the classifier wire.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for instrument operations.
pub type Result<T> = std::result::Result<T, InstrumentError>;
