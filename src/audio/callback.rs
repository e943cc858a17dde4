//! Audio callback: runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer, mixes every scheduled voice against
//! the sample clock, applies master volume and a hard output ceiling, then
//! publishes the advanced clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::AudioCommand;
use crate::synth::oscillator::advance_phase;
use crate::synth::Voice;

/// Output is clamped to `[-OUTPUT_CEILING, OUTPUT_CEILING]`.
pub const OUTPUT_CEILING: f32 = 0.95;

/// Initial capacity for the active voice list.
const VOICE_CAPACITY: usize = 64;

struct ActiveVoice {
    voice: Voice,
    phase: f64,
}

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    voices: Vec<ActiveVoice>,
    volume: f32,
    channels: u16,
    sample_rate: u32,
    frames_rendered: Arc<AtomicU64>,
}

impl AudioCallback {
    /// Create a callback that advances `clock` by one per rendered frame.
    pub fn new(
        consumer: HeapCons<AudioCommand>,
        channels: u16,
        sample_rate: u32,
        clock: Arc<AtomicU64>,
    ) -> Self {
        Self {
            consumer,
            voices: Vec::with_capacity(VOICE_CAPACITY),
            volume: 1.0,
            channels,
            sample_rate,
            frames_rendered: clock,
        }
    }

    /// Called by cpal for each buffer. Fills interleaved `output`.
    pub fn process(&mut self, output: &mut [f32]) {
        // 1. Drain all pending commands from the ring buffer.
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::Play(voice) => self.voices.push(ActiveVoice { voice, phase: 0.0 }),
                AudioCommand::SetVolume(v) => self.volume = v.clamp(0.0, 1.0),
            }
        }

        // 2. Mix voices frame by frame on the sample clock.
        let channels = self.channels.max(1) as usize;
        let sample_rate = self.sample_rate as f64;
        let mut frame = self.frames_rendered.load(Ordering::Acquire);

        for out_frame in output.chunks_mut(channels) {
            let t = frame as f64 / sample_rate;
            let mut mix = 0.0f64;
            for active in self.voices.iter_mut() {
                if active.voice.is_active(t) {
                    mix += active.voice.sample(t, active.phase);
                    active.phase =
                        advance_phase(active.phase, active.voice.frequency(), self.sample_rate);
                }
            }
            let sample = (mix as f32 * self.volume).clamp(-OUTPUT_CEILING, OUTPUT_CEILING);
            for s in out_frame.iter_mut() {
                *s = sample;
            }
            frame += 1;
        }

        // 3. Publish the clock and drop finished voices.
        self.frames_rendered.store(frame, Ordering::Release);
        let now = frame as f64 / sample_rate;
        self.voices.retain(|v| !v.voice.is_finished(now));
    }

    /// Number of voices still scheduled or sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{GainPoint, Waveform};
    use ringbuf::{
        traits::{Producer, Split},
        HeapRb,
    };

    const SR: u32 = 1000;

    /// Helper: create a callback, its producer, and the shared clock.
    fn setup() -> (
        ringbuf::HeapProd<AudioCommand>,
        AudioCallback,
        Arc<AtomicU64>,
    ) {
        let rb = HeapRb::<AudioCommand>::new(16);
        let (prod, cons) = rb.split();
        let clock = Arc::new(AtomicU64::new(0));
        let callback = AudioCallback::new(cons, 2, SR, clock.clone());
        (prod, callback, clock)
    }

    fn square(gain: f64, start: f64, stop: f64) -> Voice {
        Voice::new(100.0, Waveform::Square)
            .schedule_gain([GainPoint::Set {
                value: gain,
                at: start,
            }])
            .start(start)
            .stop(stop)
    }

    #[test]
    fn silence_on_empty() {
        let (_prod, mut callback, _) = setup();
        let mut output = vec![999.0f32; 64];
        callback.process(&mut output);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn clock_advances_per_frame() {
        let (_prod, mut callback, clock) = setup();
        let mut output = vec![0.0f32; 64]; // 32 stereo frames
        callback.process(&mut output);
        assert_eq!(clock.load(Ordering::Acquire), 32);
    }

    #[test]
    fn voice_sounds_only_inside_its_window() {
        let (mut prod, mut callback, _) = setup();
        prod.try_push(AudioCommand::Play(square(0.5, 0.010, 0.020)))
            .unwrap();

        let mut output = vec![0.0f32; 60]; // 30 frames = 30ms at 1 kHz
        callback.process(&mut output);

        // Frames 0..10 silent, 10..20 at +0.5 (first half-cycle of 100 Hz), 20.. silent.
        assert!(output[..20].iter().all(|&s| s == 0.0));
        assert!((output[20] - 0.5).abs() < 1e-6);
        assert!((output[21] - 0.5).abs() < 1e-6);
        assert!(output[40..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn finished_voices_are_dropped() {
        let (mut prod, mut callback, _) = setup();
        prod.try_push(AudioCommand::Play(square(0.2, 0.0, 0.005)))
            .unwrap();
        let mut output = vec![0.0f32; 20];
        callback.process(&mut output);
        assert_eq!(callback.active_voices(), 0);
    }

    #[test]
    fn future_voices_are_kept() {
        let (mut prod, mut callback, _) = setup();
        prod.try_push(AudioCommand::Play(square(0.2, 1.0, 1.1)))
            .unwrap();
        let mut output = vec![0.0f32; 20];
        callback.process(&mut output);
        assert_eq!(callback.active_voices(), 1);
    }

    #[test]
    fn volume_scales_mix() {
        let (mut prod, mut callback, _) = setup();
        prod.try_push(AudioCommand::SetVolume(0.5)).unwrap();
        prod.try_push(AudioCommand::Play(square(0.4, 0.0, 1.0)))
            .unwrap();
        let mut output = vec![0.0f32; 2];
        callback.process(&mut output);
        assert!((output[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn mix_is_clamped_to_ceiling() {
        let (mut prod, mut callback, _) = setup();
        for _ in 0..4 {
            prod.try_push(AudioCommand::Play(square(0.5, 0.0, 1.0)))
                .unwrap();
        }
        let mut output = vec![0.0f32; 2];
        callback.process(&mut output);
        assert!((output[0] - OUTPUT_CEILING).abs() < 1e-6);
    }
}
