//! Duplex streaming to the transcription service.

pub mod messages;
pub mod session;
pub mod token;

pub use messages::{InboundMessage, OutboundMessage};
pub use session::{SessionEvent, SessionState, StreamParams, StreamSession};
pub use token::fetch_stream_token;
