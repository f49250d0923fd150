//! Fixed-duration microphone recording using cpal.
//!
//! Records at the device's native sample rate and downsamples to the
//! configured pipeline rate (default 16 kHz mono). cpal streams are not
//! `Send`, so each recording runs on a blocking worker thread that owns
//! the stream for its whole lifetime.

use crate::audio::AudioCapture;
use crate::config::AudioConfig;
use crate::error::{AssistantError, Result};
use crate::pipeline::messages::AudioClip;
use async_trait::async_trait;
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Microphone recorder producing fixed-duration clips.
pub struct CpalRecorder {
    config: AudioConfig,
}

impl CpalRecorder {
    /// Create a recorder and verify an input device is present.
    ///
    /// # Errors
    ///
    /// Returns an audio error if no usable input device exists.
    pub fn new(config: &AudioConfig) -> Result<Self> {
        // Open once up front so a missing microphone fails at startup,
        // not on the first listen.
        let (device, stream_config) = open_input(config)?;
        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!(
            "input device: {device_name} ({}Hz, {} channels)",
            stream_config.sample_rate, stream_config.channels
        );

        Ok(Self {
            config: config.clone(),
        })
    }
}

#[async_trait]
impl AudioCapture for CpalRecorder {
    async fn capture(&self, duration: Duration) -> Result<AudioClip> {
        let config = self.config.clone();
        let samples = tokio::task::spawn_blocking(move || record_blocking(&config, duration))
            .await
            .map_err(|e| AssistantError::Audio(format!("capture task failed: {e}")))??;

        Ok(AudioClip {
            samples,
            sample_rate: self.config.sample_rate,
            captured_at: Instant::now(),
        })
    }
}

/// Find the configured (or default) input device and its native config.
fn open_input(config: &AudioConfig) -> Result<(cpal::Device, StreamConfig)> {
    let host = cpal::default_host();

    let device = if let Some(ref name) = config.input_device {
        host.input_devices()
            .map_err(|e| AssistantError::Audio(format!("cannot enumerate devices: {e}")))?
            .find(|d| {
                d.description()
                    .ok()
                    .map(|desc| desc.name() == name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| AssistantError::Audio(format!("input device '{name}' not found")))?
    } else {
        host.default_input_device()
            .ok_or_else(|| AssistantError::Audio("no default input device".into()))?
    };

    let default_config = device
        .default_input_config()
        .map_err(|e| AssistantError::Audio(format!("no default input config: {e}")))?;

    let stream_config = StreamConfig {
        channels: default_config.channels(),
        sample_rate: default_config.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };

    Ok((device, stream_config))
}

/// Record for `duration` on the current thread and return mono samples
/// at the configured target rate.
fn record_blocking(config: &AudioConfig, duration: Duration) -> Result<Vec<f32>> {
    let (device, stream_config) = open_input(config)?;
    let native_rate = stream_config.sample_rate;
    let native_channels = stream_config.channels;
    let target_rate = config.sample_rate;

    let buffer = Arc::new(Mutex::new(Vec::<f32>::new()));
    let write_buffer = Arc::clone(&buffer);

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = write_buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            move |err| {
                error!("audio input stream error: {err}");
            },
            None,
        )
        .map_err(|e| AssistantError::Audio(format!("failed to build input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| AssistantError::Audio(format!("failed to start input stream: {e}")))?;

    std::thread::sleep(duration);
    drop(stream);

    let raw = buffer
        .lock()
        .map(|mut buf| std::mem::take(&mut *buf))
        .unwrap_or_else(|poisoned| std::mem::take(&mut *poisoned.into_inner()));

    if raw.is_empty() {
        return Err(AssistantError::Audio(
            "recording produced no samples".into(),
        ));
    }

    let mono = if native_channels > 1 {
        to_mono(&raw, native_channels)
    } else {
        raw
    };

    let samples = if native_rate != target_rate {
        downsample(&mono, native_rate, target_rate)
    } else {
        mono
    };

    Ok(samples)
}

/// Convert interleaved multi-channel audio to mono by averaging channels.
fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    let ch = channels as usize;
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Simple linear-interpolation downsampler.
///
/// Sufficient for speech: energy above 8 kHz does not matter for
/// transcription, so no anti-alias filter is needed for 48 kHz → 16 kHz.
fn downsample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = src_rate as f64 / dst_rate as f64;
    let out_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] as f64 * (1.0 - frac) + samples[idx + 1] as f64 * frac
        } else {
            samples[idx.min(samples.len() - 1)] as f64
        };

        output.push(sample as f32);
    }

    output
}
