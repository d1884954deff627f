//! Frame converter: normalizes capture frames into outbound PCM chunks.
//!
//! Each incoming frame is downmixed to mono, resampled to the target rate,
//! quantized to 16-bit little-endian PCM, and accumulated until a full
//! fixed-size chunk is available. Sub-chunk remainders carry over to the
//! next frame.

use crate::audio::frame::{AudioFrame, PcmChunk};
use crate::audio::resampler::LinearResampler;
use crate::defaults;
use crate::error::{Result, ScribeError};

/// Configuration for the frame converter.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Target sample rate for outbound PCM.
    pub target_rate: u32,
    /// Samples per outbound chunk.
    pub chunk_samples: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            target_rate: defaults::TARGET_SAMPLE_RATE,
            chunk_samples: defaults::CHUNK_SAMPLES,
        }
    }
}

/// Converts arbitrary-rate, possibly multi-channel frames into canonical
/// mono 16-bit PCM chunks.
pub struct FrameConverter {
    config: ConverterConfig,
    /// Bytes quantized but not yet large enough for a full chunk.
    pending: Vec<u8>,
}

impl FrameConverter {
    /// Creates a converter with default configuration.
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// Creates a converter with custom configuration.
    pub fn with_config(config: ConverterConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
        }
    }

    /// Bytes currently held in the accumulator (always < one chunk after
    /// `process` returns).
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    /// Clears accumulated state between sessions.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Processes one frame and returns zero or more complete chunks.
    ///
    /// Returns an error for malformed frames (zero rate, zero channels);
    /// the caller logs and drops the frame, never the session.
    pub fn process(&mut self, frame: &AudioFrame) -> Result<Vec<PcmChunk>> {
        if frame.sample_rate == 0 {
            return Err(ScribeError::InvalidFrame {
                message: "sample rate must be positive".to_string(),
            });
        }
        if frame.channels == 0 {
            return Err(ScribeError::InvalidFrame {
                message: "channel count must be at least 1".to_string(),
            });
        }

        let mono = downmix(&frame.samples, frame.channels);

        let resampled = if frame.sample_rate != self.config.target_rate {
            LinearResampler::new(frame.sample_rate, self.config.target_rate).resample(&mono)
        } else {
            mono
        };

        self.pending.reserve(resampled.len() * 2);
        for sample in resampled {
            self.pending
                .extend_from_slice(&quantize(sample).to_le_bytes());
        }

        let chunk_bytes = self.config.chunk_samples * 2;
        let mut chunks = Vec::new();
        while self.pending.len() >= chunk_bytes {
            let rest = self.pending.split_off(chunk_bytes);
            let chunk = std::mem::replace(&mut self.pending, rest);
            chunks.push(PcmChunk::new(chunk));
        }

        Ok(chunks)
    }
}

impl Default for FrameConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Downmixes interleaved samples to mono by averaging all channels per
/// sample index. Trailing samples that don't fill a full index are dropped.
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Clips to [-1.0, 1.0] and truncates to a 16-bit sample.
///
/// Negative values scale by 32768, positive by 32767, matching the capture
/// side of the wire format.
fn quantize(sample: f32) -> i16 {
    let clipped = sample.clamp(-1.0, 1.0);
    let scaled = if clipped < 0.0 {
        clipped * 32768.0
    } else {
        clipped * 32767.0
    };
    scaled as i16
}
