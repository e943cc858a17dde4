//! MIDI output: channel-voice messages and the port they are sent to.

pub mod message;
pub mod output;

pub use message::{scale_to_midi, MidiMessage};
pub use output::{MidiTransport, MidirTransport};
