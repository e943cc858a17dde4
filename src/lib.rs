//! Gestural: a material-classification-driven instrument.
//!
//! An external image classifier labels what the camera sees (coral, stone,
//! wood, or all three together). Each label and its confidence become an
//! on/off + intensity control signal that plays either a MIDI port or the
//! built-in synthesizer.

pub mod audio;
pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod gesture;
pub mod material;
pub mod midi;
pub mod pipeline;
pub mod synth;

pub use error::{InstrumentError, Result};
