//! Drive a [`Synth`] from a cpal output stream.
//!
//! The stream callback renders one sample per frame and copies it to every channel.
//! [`AudioClock`] counts rendered frames so that the input thread can timestamp key
//! events on the same clock the audio thread renders with.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::envelope::Envelope;
use crate::error::{Result, SynthError};
use crate::{Config, Synth};

/// Stream time derived from the number of frames rendered so far.
#[derive(Debug)]
pub struct AudioClock {
    frames: AtomicU64,
    sample_rate: u32,
}

impl AudioClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    /// The time of the next frame to render, in seconds.
    pub fn time(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    /// Claim the next frame and return its time.
    pub fn tick(&self) -> f64 {
        self.frames.fetch_add(1, Ordering::AcqRel) as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Names of the output devices on the default host.
pub fn output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| SynthError::Device(e.to_string()))?;
    let names: Vec<String> = devices
        .map(|device| device.name().unwrap_or_else(|_| "<unnamed>".to_string()))
        .collect();
    if names.is_empty() {
        return Err(SynthError::NoOutputDevice);
    }
    tracing::info!(host = host.id().name(), count = names.len(), "found output devices");
    Ok(names)
}

/// Choose an `f32` stream among the device's supported ranges.
///
/// A range with the requested channel count and sample rate wins. Otherwise the first
/// `f32` range is used at its highest rate.
fn pick_config(
    ranges: impl IntoIterator<Item = cpal::SupportedStreamConfigRange>,
    cfg: &Config,
) -> Result<cpal::SupportedStreamConfig> {
    let rate = cpal::SampleRate(cfg.sample_rate);
    let f32_ranges: Vec<_> = ranges
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .collect();

    let exact = f32_ranges.iter().find(|c| {
        c.channels() == cfg.channels && c.min_sample_rate() <= rate && rate <= c.max_sample_rate()
    });
    match (exact, f32_ranges.first()) {
        (Some(c), _) => Ok(c.clone().with_sample_rate(rate)),
        (None, Some(c)) => Ok(c.clone().with_max_sample_rate()),
        (None, None) => Err(SynthError::Device(
            "no f32 output configuration supported".to_string(),
        )),
    }
}

/// A playing output stream. Dropping it stops the audio.
pub struct AudioOutput {
    _stream: cpal::Stream,
    clock: Arc<AudioClock>,
    device_name: String,
}

impl AudioOutput {
    /// Open the default output device and start rendering `synth` into it.
    pub fn start<E>(synth: Arc<Synth<E>>, cfg: &Config) -> Result<Self>
    where
        E: Envelope + Send + Sync + 'static,
    {
        cfg.validate()?;
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SynthError::NoOutputDevice)?;
        let device_name = device
            .name()
            .map_err(|e| SynthError::Device(e.to_string()))?;

        let ranges = device
            .supported_output_configs()
            .map_err(|e| SynthError::Device(e.to_string()))?;
        let supported = pick_config(ranges, cfg)?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        if sample_rate != cfg.sample_rate || channels != cfg.channels {
            tracing::warn!(
                requested_rate = cfg.sample_rate,
                requested_channels = cfg.channels,
                sample_rate,
                channels,
                "device does not support the requested stream, using its own"
            );
        }

        let mut stream_config = supported.config();
        if let Some(frames) = cfg.buffer_size {
            stream_config.buffer_size = cpal::BufferSize::Fixed(frames);
        }

        let clock = Arc::new(AudioClock::new(sample_rate));
        let frame_len = channels as usize;
        let stream = device
            .build_output_stream(
                &stream_config,
                {
                    let clock = Arc::clone(&clock);
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        for frame in data.chunks_mut(frame_len) {
                            let sample = synth.render_sample(clock.tick()) as f32;
                            frame.fill(sample);
                        }
                    }
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| SynthError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| SynthError::Stream(e.to_string()))?;
        tracing::info!(
            device = %device_name,
            sample_rate,
            channels,
            "output stream started"
        );

        Ok(Self {
            _stream: stream,
            clock,
            device_name,
        })
    }

    /// Current stream time, for timestamping key events.
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn clock(&self) -> &Arc<AudioClock> {
        &self.clock
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}
