//! Synth backend: fire-and-forget bursts, or the arpeggio for the combined
//! material. There is no sustained note, so note-off is silent.

use tracing::debug;

use super::{BackendKind, SoundBackend};
use crate::audio::AudioHost;
use crate::error::Result;
use crate::material::{frequency_and_waveform, SoundMapping};
use crate::synth::{arpeggio, burst};

/// Plays the control signal on an [`AudioHost`].
pub struct SynthBackend {
    host: Box<dyn AudioHost>,
}

impl SynthBackend {
    pub fn new(host: Box<dyn AudioHost>) -> Self {
        Self { host }
    }
}

impl SoundBackend for SynthBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Synth
    }

    fn note_on(&mut self, mapping: &SoundMapping, range: f32) -> Result<()> {
        let now = self.host.current_time();

        if mapping.is_combined() {
            debug!(now, range, "scheduling arpeggio");
            for voice in arpeggio::voices(now, range) {
                self.host.schedule(voice)?;
            }
            return Ok(());
        }

        let (frequency, waveform) = frequency_and_waveform(mapping.note);
        debug!(frequency, %waveform, range, "scheduling burst");
        self.host.schedule(burst(frequency, waveform, range, now))
    }

    fn note_off(&mut self, _mapping: &SoundMapping) -> Result<()> {
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.host.resume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::resolve;
    use crate::synth::{Voice, Waveform};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeHost {
        now: f64,
        voices: Arc<Mutex<Vec<Voice>>>,
        resumes: Arc<Mutex<usize>>,
    }

    impl AudioHost for FakeHost {
        fn current_time(&self) -> f64 {
            self.now
        }

        fn schedule(&mut self, voice: Voice) -> Result<()> {
            self.voices.lock().unwrap().push(voice);
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            *self.resumes.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn backend(now: f64) -> (SynthBackend, FakeHost) {
        let host = FakeHost {
            now,
            ..FakeHost::default()
        };
        (SynthBackend::new(Box::new(host.clone())), host)
    }

    #[test]
    fn single_material_schedules_one_burst() {
        let (mut b, host) = backend(2.0);
        b.note_on(&resolve("stone").unwrap(), 0.5).unwrap();
        let voices = host.voices.lock().unwrap();
        assert_eq!(voices.len(), 1);
        let v = &voices[0];
        assert!((v.frequency() - 130.81).abs() < 1e-9);
        assert_eq!(v.waveform(), Waveform::Sawtooth);
        assert!((v.gain().value_at(2.05) - 0.15).abs() < 1e-9);
        assert!((v.start_time() - 2.0).abs() < 1e-12);
        assert!((v.stop_time() - 2.1).abs() < 1e-12);
    }

    #[test]
    fn combined_material_schedules_four_voices_at_once() {
        let (mut b, host) = backend(1.0);
        b.note_on(&resolve("wood+coral+stone").unwrap(), 1.0)
            .unwrap();
        let voices = host.voices.lock().unwrap();
        assert_eq!(voices.len(), 4);
        let third = &voices[2];
        assert!((third.frequency() - 261.63 * 1.5).abs() < 1e-9);
        assert_eq!(third.waveform(), Waveform::Triangle);
        assert!((third.start_time() - 1.4).abs() < 1e-9);
        assert!((third.gain().value_at(1.41) - 0.06).abs() < 1e-9);
    }

    #[test]
    fn note_off_is_silent() {
        let (mut b, host) = backend(0.0);
        b.note_off(&resolve("coral").unwrap()).unwrap();
        assert!(host.voices.lock().unwrap().is_empty());
    }

    #[test]
    fn resume_reaches_host_every_time() {
        let (mut b, host) = backend(0.0);
        b.resume().unwrap();
        b.resume().unwrap();
        assert_eq!(*host.resumes.lock().unwrap(), 2);
    }
}
