//! Channel-voice messages the instrument sends.
//!
//! Channels are stored 0-based here; [`SoundMapping`](crate::material::SoundMapping)
//! keeps the 1-based channel players see.
//!
//! Wire format:
//! - Note On:  `[0x90 | channel, note, velocity]`
//! - Note Off: `[0x80 | channel, note, 0]`
//! - CC:       `[0xB0 | channel, controller, value]`

/// A MIDI channel-voice message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiMessage {
    /// Note-On on a 1-based channel.
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        MidiMessage::NoteOn {
            channel: zero_based(channel),
            note: note & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    /// Note-Off on a 1-based channel.
    pub fn note_off(channel: u8, note: u8) -> Self {
        MidiMessage::NoteOff {
            channel: zero_based(channel),
            note: note & 0x7F,
        }
    }

    /// Control-Change on a 1-based channel.
    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        MidiMessage::ControlChange {
            channel: zero_based(channel),
            controller: controller & 0x7F,
            value: value & 0x7F,
        }
    }

    /// Encode as raw bytes.
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | channel, note, velocity],
            MidiMessage::NoteOff { channel, note } => [0x80 | channel, note, 0],
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => [0xB0 | channel, controller, value],
        }
    }

    /// Decode raw bytes. Note-On with velocity 0 is read as Note-Off.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }
        let channel = bytes[0] & 0x0F;
        match bytes[0] & 0xF0 {
            0x90 if bytes[2] == 0 => Some(MidiMessage::NoteOff {
                channel,
                note: bytes[1],
            }),
            0x90 => Some(MidiMessage::NoteOn {
                channel,
                note: bytes[1],
                velocity: bytes[2],
            }),
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                note: bytes[1],
            }),
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                controller: bytes[1],
                value: bytes[2],
            }),
            _ => None,
        }
    }
}

fn zero_based(channel: u8) -> u8 {
    channel.saturating_sub(1) & 0x0F
}

/// Scale a `[0, 1]` control value to a 7-bit MIDI value: `floor(v * 127)`,
/// clamped to `0..=127`. NaN maps to 0.
pub fn scale_to_midi(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 127.0).floor() as u8
}
