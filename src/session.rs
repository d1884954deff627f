//! Encounter session: composition root for one recording.
//!
//! Owns the converter, the outbound queue, the transcript accumulator, and
//! the transport session. Constructed at session start and reusable across
//! sequential encounters; there is no process-wide state.

use crate::audio::converter::{ConverterConfig, FrameConverter};
use crate::audio::frame::AudioFrame;
use crate::audio::queue::ChunkQueue;
use crate::config::Config;
use crate::defaults;
use crate::error::{Result, ScribeError};
use crate::keyterms::{Specialty, active_keyterms};
use crate::stream::session::{SessionEvent, SessionState, StreamParams, StreamSession};
use crate::stream::token::fetch_stream_token;
use crate::transcript::{TranscriptSnapshot, TurnAccumulator};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// One live encounter: audio in, transcript out.
pub struct EncounterSession {
    config: Config,
    converter: Mutex<FrameConverter>,
    queue: Arc<ChunkQueue>,
    accumulator: Arc<TurnAccumulator>,
    stream: StreamSession,
}

impl EncounterSession {
    /// Creates an idle session from configuration.
    pub fn new(config: Config) -> Self {
        let converter = FrameConverter::with_config(ConverterConfig {
            target_rate: config.audio.sample_rate,
            chunk_samples: config.audio.chunk_samples,
        });
        let queue = Arc::new(ChunkQueue::with_capacity(config.audio.queue_capacity));

        Self {
            config,
            converter: Mutex::new(converter),
            queue,
            accumulator: Arc::new(TurnAccumulator::new()),
            stream: StreamSession::new(),
        }
    }

    /// Sets a lifecycle event sender for the foreground consumer.
    pub fn with_event_sender(mut self, tx: crossbeam_channel::Sender<SessionEvent>) -> Self {
        self.stream = self.stream.with_event_sender(tx);
        self
    }

    /// Current transport state.
    pub fn state(&self) -> SessionState {
        self.stream.state()
    }

    /// True while the session is streaming.
    pub fn is_active(&self) -> bool {
        self.stream.is_active()
    }

    /// Service-side session identifier, once known.
    pub fn session_id(&self) -> Option<String> {
        self.stream.session_id()
    }

    /// Outbound queue, for diagnostics (length, evictions).
    pub fn queue(&self) -> &ChunkQueue {
        &self.queue
    }

    /// Starts a fresh recording session.
    ///
    /// Fetches a temporary token, opens the duplex connection, and starts
    /// both lanes. Prior transcript and converter state are discarded.
    pub async fn start(&mut self, specialty: Specialty, custom_keyterms: &str) -> Result<()> {
        if self.stream.state() != SessionState::Idle {
            return Err(ScribeError::SessionActive);
        }
        if self.config.streaming.api_key.is_empty() {
            return Err(ScribeError::MissingApiKey {
                variable: "MEDSCRIBE_STT_API_KEY".to_string(),
            });
        }

        self.accumulator.reset();
        lock(&self.converter).reset();

        let token = fetch_stream_token(
            &self.config.streaming.token_endpoint,
            &self.config.streaming.api_key,
            defaults::TOKEN_EXPIRY_SECS,
        )
        .await?;

        let params = StreamParams {
            endpoint: self.config.streaming.endpoint.clone(),
            token,
            sample_rate: self.config.audio.sample_rate,
            format_turns: self.config.streaming.format_turns,
            end_of_turn_confidence: self.config.streaming.end_of_turn_confidence,
            min_end_of_turn_silence_ms: self.config.streaming.min_end_of_turn_silence_ms,
            max_turn_silence_ms: self.config.streaming.max_turn_silence_ms,
            keyterms: active_keyterms(specialty, custom_keyterms),
        };

        self.stream
            .open(&params, self.queue.clone(), self.accumulator.clone())
            .await
    }

    /// Feeds one capture frame into the pipeline.
    ///
    /// Conversion faults are logged and the frame dropped; the session
    /// continues.
    pub fn push_frame(&self, frame: &AudioFrame) {
        let chunks = match lock(&self.converter).process(frame) {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(sequence = frame.sequence, "dropping frame: {e}");
                return;
            }
        };

        for chunk in chunks {
            self.queue.push(chunk);
        }
    }

    /// Current transcript view (finalized turns plus pending partial).
    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.accumulator.snapshot()
    }

    /// Stops the session. Safe to call when idle, and safe to call twice.
    pub async fn stop(&mut self) {
        self.stream.close().await;
    }

    /// Stops the session and returns the final transcript.
    pub async fn finish(&mut self) -> TranscriptSnapshot {
        self.stop().await;
        self.snapshot()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
