//! Default configuration constants for medscribe.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Target audio sample rate in Hz.
///
/// 16kHz is the standard for streaming speech recognition and what the
/// transcription service expects for `pcm_s16le` input.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Samples per outbound PCM chunk.
///
/// 800 samples at 16kHz is 50ms of audio: small enough for low-latency
/// streaming, large enough to keep frame overhead negligible.
pub const CHUNK_SAMPLES: usize = 800;

/// Bytes per outbound PCM chunk (16-bit samples).
pub const CHUNK_BYTES: usize = CHUNK_SAMPLES * 2;

/// Capacity of the outbound chunk queue.
///
/// 500 chunks is 25 seconds of audio. When the sender lane falls behind
/// (slow network), the oldest chunks are dropped so live audio stays fresh.
pub const QUEUE_CAPACITY: usize = 500;

/// Bounded wait used by the lanes when polling for work.
///
/// Both the sender and receiver lanes wake at least this often to observe
/// the stop signal, so shutdown latency is capped at one interval.
pub const LANE_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Grace period after requesting termination, before the socket is dropped.
///
/// Gives the transcription service time to deliver its Termination
/// acknowledgment with the accumulated audio duration.
pub const TERMINATION_GRACE: Duration = Duration::from_millis(1500);

/// Audio frame size used by file-based sources, in samples per channel.
///
/// Matches the capture block size of the original browser recorder.
pub const SOURCE_FRAME_SAMPLES: usize = 4096;

/// Streaming endpoint of the transcription service.
pub const STT_ENDPOINT: &str = "wss://streaming.assemblyai.com/v3/ws";

/// Token endpoint of the transcription service.
pub const STT_TOKEN_ENDPOINT: &str = "https://streaming.assemblyai.com/v3/token";

/// Lifetime requested for temporary streaming tokens, in seconds.
pub const TOKEN_EXPIRY_SECS: u32 = 480;

/// Confidence above which the service may end a turn early.
pub const END_OF_TURN_CONFIDENCE: f32 = 0.7;

/// Minimum silence (ms) to end a turn when the service is confident.
pub const MIN_END_OF_TURN_SILENCE_MS: u32 = 800;

/// Maximum silence (ms) before a turn is force-ended.
pub const MAX_TURN_SILENCE_MS: u32 = 3600;

/// Chat-completions endpoint of the language-model service.
pub const LLM_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Completion model used for post-session enrichment.
pub const LLM_MODEL: &str = "gpt-4.1-nano-2025-04-14";

/// Output token cap for enrichment calls.
pub const LLM_MAX_TOKENS: u32 = 4000;

/// Sampling temperature for enrichment calls.
///
/// Clinical documentation wants determinism, not creativity.
pub const LLM_TEMPERATURE: f32 = 0.1;

/// Timeout for a single enrichment HTTP call, in seconds.
pub const LLM_TIMEOUT_SECS: u64 = 120;
