//! medscribe - Real-time medical encounter transcription
//!
//! Streams microphone or file audio to a remote speech-to-text service over
//! a duplex socket, accumulates speaker turns, and generates post-session
//! clinical notes, PII redaction, and sentiment analysis.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod enrich;
pub mod error;
pub mod keyterms;
pub mod session;
pub mod stream;
pub mod transcript;

// Core pipeline types (frames → queue → duplex session → transcript)
pub use audio::converter::{ConverterConfig, FrameConverter};
pub use audio::frame::{AudioFrame, PcmChunk};
pub use audio::queue::ChunkQueue;
pub use session::EncounterSession;
pub use stream::session::{SessionEvent, SessionState, StreamParams, StreamSession};
pub use transcript::{Speaker, TranscriptSnapshot, Turn, TurnAccumulator, TurnEvent};

// Enrichment
pub use enrich::{
    CompletionBackend, Enricher, HttpCompletionClient, MockCompletionBackend, SentimentOutcome,
    SessionResult, TaskOutcome,
};
pub use keyterms::{Specialty, active_keyterms};

// Error handling
pub use error::{Result, ScribeError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
