//! MIDI backend: Note-On + CC while a material is in frame, Note-Off when it
//! goes away.

use std::collections::BTreeSet;

use super::{BackendKind, SoundBackend};
use crate::error::{InstrumentError, Result};
use crate::material::SoundMapping;
use crate::midi::{scale_to_midi, MidiMessage, MidiTransport};

/// Sends the instrument's control signal to a MIDI port.
pub struct MidiBackend {
    transport: Box<dyn MidiTransport>,
    /// (1-based channel, note) pairs with an outstanding Note-On.
    held: BTreeSet<(u8, u8)>,
}

impl MidiBackend {
    pub fn new(transport: Box<dyn MidiTransport>) -> Self {
        Self {
            transport,
            held: BTreeSet::new(),
        }
    }

    pub fn port_name(&self) -> &str {
        self.transport.port_name()
    }

    /// Notes turned on and not yet turned off.
    pub fn held_notes(&self) -> impl Iterator<Item = &(u8, u8)> {
        self.held.iter()
    }

    /// Send every message in order. A failed send does not stop the rest;
    /// the first failure is reported.
    fn send_all(&mut self, messages: &[MidiMessage]) -> Result<()> {
        let mut first_err: Option<InstrumentError> = None;
        for msg in messages {
            if let Err(e) = self.transport.send(&msg.to_bytes()) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl SoundBackend for MidiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Midi
    }

    fn note_on(&mut self, mapping: &SoundMapping, range: f32) -> Result<()> {
        let value = scale_to_midi(range);
        self.held.insert((mapping.channel, mapping.note));
        // Note-On must precede the CC.
        self.send_all(&[
            MidiMessage::note_on(mapping.channel, mapping.note, value),
            MidiMessage::control_change(mapping.channel, mapping.control_index, value),
        ])
    }

    fn note_off(&mut self, mapping: &SoundMapping) -> Result<()> {
        self.held.remove(&(mapping.channel, mapping.note));
        self.send_all(&[MidiMessage::note_off(mapping.channel, mapping.note)])
    }

    fn release_all(&mut self) -> Result<()> {
        let held = std::mem::take(&mut self.held);
        let offs: Vec<MidiMessage> = held
            .into_iter()
            .map(|(channel, note)| MidiMessage::note_off(channel, note))
            .collect();
        self.send_all(&offs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::resolve;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        fail: bool,
    }

    impl MidiTransport for Capture {
        fn send(&mut self, bytes: &[u8]) -> Result<()> {
            self.sent.lock().unwrap().push(bytes.to_vec());
            if self.fail {
                Err(InstrumentError::Send("port gone".into()))
            } else {
                Ok(())
            }
        }

        fn port_name(&self) -> &str {
            "capture"
        }
    }

    fn backend() -> (MidiBackend, Arc<Mutex<Vec<Vec<u8>>>>) {
        let cap = Capture::default();
        let sent = cap.sent.clone();
        (MidiBackend::new(Box::new(cap)), sent)
    }

    #[test]
    fn note_on_then_cc() {
        let (mut b, sent) = backend();
        b.note_on(&resolve("coral").unwrap(), 1.0).unwrap();
        let sent = sent.lock().unwrap();
        assert_eq!(*sent, vec![vec![0x90, 72, 127], vec![0xB0, 1, 127]]);
    }

    #[test]
    fn velocity_and_cc_are_floored() {
        let (mut b, sent) = backend();
        b.note_on(&resolve("stone").unwrap(), 0.5).unwrap();
        let sent = sent.lock().unwrap();
        assert_eq!(sent[0], vec![0x91, 48, 63]);
        assert_eq!(sent[1], vec![0xB1, 2, 63]);
    }

    #[test]
    fn note_off_uses_zero_velocity() {
        let (mut b, sent) = backend();
        b.note_off(&resolve("wood").unwrap()).unwrap();
        assert_eq!(*sent.lock().unwrap(), vec![vec![0x82, 60, 0]]);
    }

    #[test]
    fn send_failure_is_reported_but_cc_still_attempted() {
        let cap = Capture {
            fail: true,
            ..Capture::default()
        };
        let sent = cap.sent.clone();
        let mut b = MidiBackend::new(Box::new(cap));
        let result = b.note_on(&resolve("wood").unwrap(), 0.8);
        assert!(matches!(result, Err(InstrumentError::Send(_))));
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn release_all_turns_off_held_notes() {
        let (mut b, sent) = backend();
        b.note_on(&resolve("coral").unwrap(), 0.9).unwrap();
        b.note_on(&resolve("wood+coral+stone").unwrap(), 0.9).unwrap();
        b.note_on(&resolve("wood").unwrap(), 0.9).unwrap();
        b.note_off(&resolve("wood").unwrap()).unwrap();
        sent.lock().unwrap().clear();

        b.release_all().unwrap();
        let sent = sent.lock().unwrap();
        assert_eq!(*sent, vec![vec![0x80, 72, 0], vec![0x83, 84, 0]]);
        assert_eq!(b.held_notes().count(), 0);
    }

    #[test]
    fn repeated_note_on_is_held_once() {
        let (mut b, _) = backend();
        let coral = resolve("coral").unwrap();
        b.note_on(&coral, 0.5).unwrap();
        b.note_on(&coral, 0.7).unwrap();
        assert_eq!(b.held_notes().count(), 1);
    }
}
