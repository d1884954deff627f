//! Frame types for the audio ingestion pipeline.
//!
//! Defines the data structures that flow from capture to the outbound queue.

use std::time::Instant;

/// Raw audio frame from a capture source.
///
/// Samples are interleaved float PCM in [-1.0, 1.0] at the source's native
/// rate and channel count. Consumed exactly once by the converter.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Sequence number for ordering frames.
    pub sequence: u64,
    /// Timestamp when the audio was captured.
    pub timestamp: Instant,
    /// Interleaved samples, `channels` values per sample index.
    pub samples: Vec<f32>,
    /// Source sample rate in Hz.
    pub sample_rate: u32,
    /// Source channel count.
    pub channels: u16,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(sequence: u64, samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            sequence,
            timestamp: Instant::now(),
            samples,
            sample_rate,
            channels,
        }
    }

    /// Returns the number of per-channel sample indices in this frame.
    ///
    /// Trailing samples that don't fill a full index are not counted.
    pub fn frames_per_channel(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames_per_channel() as u32 * 1000) / self.sample_rate
    }
}

/// A fixed-size chunk of mono 16-bit little-endian PCM at the target rate.
///
/// Immutable once created; ownership moves from the converter through the
/// queue to the sender lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmChunk {
    bytes: Vec<u8>,
}

impl PcmChunk {
    /// Wraps a byte buffer as a chunk. The buffer length must be even
    /// (whole 16-bit samples).
    pub fn new(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes.len() % 2 == 0, "PCM chunk must hold whole samples");
        Self { bytes }
    }

    /// Chunk payload as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the chunk, returning the payload for transmission.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of 16-bit samples in this chunk.
    pub fn sample_count(&self) -> usize {
        self.bytes.len() / 2
    }

    /// Returns the duration of this chunk in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        if sample_rate == 0 {
            return 0;
        }
        (self.sample_count() as u32 * 1000) / sample_rate
    }
}
