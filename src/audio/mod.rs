//! Audio engine: cpal output stream fed scheduled voices through a
//! lock-free queue.
//!
//! The engine owns the cpal stream. The pipeline thread pushes
//! [`AudioCommand`]s into a ring buffer; the audio thread drains them in its
//! callback, mixes voices against its own sample clock, and publishes that
//! clock back so [`AudioHost::current_time`] can schedule relative to it.

pub mod callback;
pub mod command;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};
use tracing::{error, info};

pub use command::AudioCommand;

use crate::error::{InstrumentError, Result};
use crate::synth::Voice;
use callback::AudioCallback;

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 1024;

/// A synthesis context that plays scheduled voices on its own clock.
pub trait AudioHost {
    /// Current time on the audio clock, in seconds.
    fn current_time(&self) -> f64;

    /// Hand a voice to the audio clock. Fire-and-forget: the voice cannot be
    /// cancelled once scheduled.
    fn schedule(&mut self, voice: Voice) -> Result<()>;

    /// Make sure the output is running. Safe to call any number of times.
    fn resume(&mut self) -> Result<()>;
}

/// The audio engine. Owns the cpal stream and ring buffer producer.
pub struct AudioEngine {
    stream: cpal::Stream,
    producer: ringbuf::HeapProd<AudioCommand>,
    clock: Arc<AtomicU64>,
    sample_rate: u32,
    channels: u16,
}

impl AudioEngine {
    /// Create and start the audio engine with the default output device.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| InstrumentError::Audio("no audio output device found".into()))?;

        let config = device
            .default_output_config()
            .map_err(|e| InstrumentError::Audio(format!("device config error: {e}")))?;

        Self::build_with_device(&device, config.sample_rate().0, config.channels())
    }

    fn build_with_device(device: &cpal::Device, sample_rate: u32, channels: u16) -> Result<Self> {
        let rb = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY);
        let (producer, consumer) = rb.split();

        let clock = Arc::new(AtomicU64::new(0));
        let mut audio_callback = AudioCallback::new(consumer, channels, sample_rate, clock.clone());

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err: cpal::StreamError| {
            error!("audio stream error: {err}");
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| InstrumentError::Audio(format!("stream build error: {e}")))?;

        stream
            .play()
            .map_err(|e| InstrumentError::Audio(format!("stream play error: {e}")))?;

        info!(sample_rate, channels, "audio output started");

        Ok(Self {
            stream,
            producer,
            clock,
            sample_rate,
            channels,
        })
    }

    /// Set master volume (clamped to 0.0..=1.0 on the audio thread).
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.push(AudioCommand::SetVolume(volume))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    fn push(&mut self, cmd: AudioCommand) -> Result<()> {
        self.producer
            .try_push(cmd)
            .map_err(|_| InstrumentError::Send("audio command ring buffer is full".into()))
    }
}

impl AudioHost for AudioEngine {
    fn current_time(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    fn schedule(&mut self, voice: Voice) -> Result<()> {
        self.push(AudioCommand::Play(voice))
    }

    fn resume(&mut self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| InstrumentError::Audio(format!("stream play error: {e}")))
    }
}
