//! Duplex transport session to the streaming transcription service.
//!
//! One session owns one WebSocket connection and two lanes: the sender lane
//! drains the chunk queue into binary frames, the receiver lane turns
//! inbound events into transcript updates. A single shared stop signal
//! unwinds both lanes; every wait is bounded so the signal is observed
//! within one poll interval.

use crate::audio::queue::ChunkQueue;
use crate::defaults;
use crate::error::{Result, ScribeError};
use crate::stream::messages::{InboundMessage, OutboundMessage};
use crate::transcript::{TurnAccumulator, TurnEvent};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Lifecycle of a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection.
    Idle,
    /// Connection being established.
    Opening,
    /// Both lanes running.
    Active,
    /// Stop signal set, termination handshake in flight.
    Closing,
}

/// Lifecycle notifications for the foreground consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Connection established, both lanes running.
    Started,
    /// Session closed after an orderly shutdown.
    Stopped,
    /// A transport fault ended the session outside an intentional close.
    Faulted { message: String },
}

/// Connection parameters for one recording session.
#[derive(Debug, Clone)]
pub struct StreamParams {
    /// WebSocket endpoint.
    pub endpoint: String,
    /// Temporary authentication token.
    pub token: String,
    /// Outbound PCM sample rate.
    pub sample_rate: u32,
    /// Request formatted, immutable turns.
    pub format_turns: bool,
    /// Confidence above which a turn may end early.
    pub end_of_turn_confidence: f32,
    /// Minimum silence (ms) to end a turn when confident.
    pub min_end_of_turn_silence_ms: u32,
    /// Maximum silence (ms) before a turn is force-ended.
    pub max_turn_silence_ms: u32,
    /// Keyterm prompts for recognition biasing (may be empty).
    pub keyterms: Vec<String>,
}

impl StreamParams {
    /// Builds the connection URL with all query parameters.
    pub fn build_url(&self) -> Result<String> {
        let mut params: Vec<(&str, String)> = vec![
            ("sample_rate", self.sample_rate.to_string()),
            ("format_turns", self.format_turns.to_string()),
            ("encoding", "pcm_s16le".to_string()),
            ("token", self.token.clone()),
            (
                "end_of_turn_confidence_threshold",
                self.end_of_turn_confidence.to_string(),
            ),
            (
                "min_end_of_turn_silence_when_confident",
                self.min_end_of_turn_silence_ms.to_string(),
            ),
            ("max_turn_silence", self.max_turn_silence_ms.to_string()),
        ];

        if !self.keyterms.is_empty() {
            let serialized =
                serde_json::to_string(&self.keyterms).map_err(|e| ScribeError::StreamConnect {
                    message: format!("failed to encode keyterms: {e}"),
                })?;
            params.push(("keyterms_prompt", serialized));
        }

        let url = reqwest::Url::parse_with_params(&self.endpoint, &params).map_err(|e| {
            ScribeError::StreamConnect {
                message: format!("invalid endpoint {}: {e}", self.endpoint),
            }
        })?;

        Ok(url.to_string())
    }
}

/// Owns one duplex connection and its two lanes for a recording session.
pub struct StreamSession {
    stop: Arc<AtomicBool>,
    state: SessionState,
    sender_task: Option<JoinHandle<Option<WsSink>>>,
    receiver_task: Option<JoinHandle<()>>,
    session_id: Arc<Mutex<Option<String>>>,
    audio_duration: Arc<Mutex<Option<f64>>>,
    event_tx: Option<crossbeam_channel::Sender<SessionEvent>>,
    poll_timeout: Duration,
    termination_grace: Duration,
}

impl StreamSession {
    /// Creates an idle session with default timing.
    pub fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            state: SessionState::Idle,
            sender_task: None,
            receiver_task: None,
            session_id: Arc::new(Mutex::new(None)),
            audio_duration: Arc::new(Mutex::new(None)),
            event_tx: None,
            poll_timeout: defaults::LANE_POLL_TIMEOUT,
            termination_grace: defaults::TERMINATION_GRACE,
        }
    }

    /// Sets a lifecycle event sender for the foreground consumer.
    pub fn with_event_sender(mut self, tx: crossbeam_channel::Sender<SessionEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Overrides the lane poll timeout (mostly for tests).
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Overrides the termination grace period (mostly for tests).
    pub fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace = grace;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while both lanes are running.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Service-side session identifier, once the Begin event has arrived.
    pub fn session_id(&self) -> Option<String> {
        lock(&self.session_id).clone()
    }

    /// Audio duration reported by the service's Termination event.
    pub fn audio_duration_seconds(&self) -> Option<f64> {
        *lock(&self.audio_duration)
    }

    /// Opens the connection and starts both lanes.
    ///
    /// Clears any prior stop signal and discards stale queued chunks before
    /// the lanes start. Fails if a session is already open.
    pub async fn open(
        &mut self,
        params: &StreamParams,
        queue: Arc<ChunkQueue>,
        accumulator: Arc<TurnAccumulator>,
    ) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(ScribeError::SessionActive);
        }

        let url = params.build_url()?;

        self.state = SessionState::Opening;
        self.stop.store(false, Ordering::SeqCst);
        *lock(&self.session_id) = None;
        *lock(&self.audio_duration) = None;

        let stale = queue.clear();
        if stale > 0 {
            debug!(stale, "discarded stale chunks from previous session");
        }
        let (ws, _response) = match connect_async(url.as_str()).await {
            Ok(ok) => ok,
            Err(e) => {
                self.state = SessionState::Idle;
                return Err(ScribeError::StreamConnect {
                    message: e.to_string(),
                });
            }
        };

        let (ws_sink, ws_source) = ws.split();

        self.sender_task = Some(tokio::spawn(sender_lane(
            ws_sink,
            queue,
            self.stop.clone(),
            self.poll_timeout,
            self.event_tx.clone(),
        )));
        self.receiver_task = Some(tokio::spawn(receiver_lane(
            ws_source,
            accumulator,
            self.stop.clone(),
            self.poll_timeout,
            self.termination_grace,
            self.event_tx.clone(),
            self.session_id.clone(),
            self.audio_duration.clone(),
        )));

        self.state = SessionState::Active;
        emit(&self.event_tx, SessionEvent::Started);
        info!("streaming session active");
        Ok(())
    }

    /// Sets the stop signal, runs the termination handshake, and tears the
    /// connection down.
    ///
    /// Idempotent: closing an idle session (or closing twice) is a no-op.
    pub async fn close(&mut self) {
        if self.sender_task.is_none() && self.receiver_task.is_none() {
            self.state = SessionState::Idle;
            return;
        }

        self.state = SessionState::Closing;
        self.stop.store(true, Ordering::SeqCst);

        // The sender observes the stop signal within one poll interval and
        // emits the Terminate request on its way out.
        let mut sink = None;
        if let Some(mut task) = self.sender_task.take() {
            match timeout(self.poll_timeout * 3, &mut task).await {
                Ok(Ok(s)) => sink = s,
                Ok(Err(e)) => warn!("sender lane panicked: {e}"),
                Err(_) => {
                    warn!("sender lane did not stop in time, aborting");
                    task.abort();
                }
            }
        }

        // The receiver drains until the Termination acknowledgment or the
        // grace deadline, whichever comes first.
        if let Some(mut task) = self.receiver_task.take() {
            match timeout(self.termination_grace + self.poll_timeout * 3, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("receiver lane panicked: {e}"),
                Err(_) => {
                    warn!("receiver lane did not stop in time, aborting");
                    task.abort();
                }
            }
        }

        if let Some(mut sink) = sink {
            // Close-time transport errors are expected and swallowed.
            let _ = sink.close().await;
        }

        if let Some(duration) = *lock(&self.audio_duration) {
            info!(duration, "session terminated by service");
        }

        self.state = SessionState::Idle;
        emit(&self.event_tx, SessionEvent::Stopped);
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn emit(event_tx: &Option<crossbeam_channel::Sender<SessionEvent>>, event: SessionEvent) {
    if let Some(tx) = event_tx {
        let _ = tx.send(event);
    }
}

/// Sender lane: queue → binary frames.
///
/// Returns the sink half for the final socket close, or `None` if the
/// socket broke mid-session.
async fn sender_lane(
    mut sink: WsSink,
    queue: Arc<ChunkQueue>,
    stop: Arc<AtomicBool>,
    poll_timeout: Duration,
    event_tx: Option<crossbeam_channel::Sender<SessionEvent>>,
) -> Option<WsSink> {
    while !stop.load(Ordering::SeqCst) {
        let Some(chunk) = queue.pop(poll_timeout).await else {
            continue;
        };

        if let Err(e) = sink.send(Message::Binary(chunk.into_bytes())).await {
            if !stop.load(Ordering::SeqCst) {
                warn!("sender lane transport error: {e}");
                emit(
                    &event_tx,
                    SessionEvent::Faulted {
                        message: format!("audio send failed: {e}"),
                    },
                );
                stop.store(true, Ordering::SeqCst);
            }
            return None;
        }
    }

    // Stop observed: request an orderly termination. The socket stays open
    // so the receiver can collect the acknowledgment.
    match OutboundMessage::Terminate.to_json() {
        Ok(json) => {
            if sink.send(Message::Text(json)).await.is_ok() {
                let _ = sink.flush().await;
            }
        }
        Err(e) => warn!("failed to encode termination request: {e}"),
    }

    Some(sink)
}

/// Receiver lane: inbound events → transcript updates.
#[allow(clippy::too_many_arguments)]
async fn receiver_lane(
    mut source: WsSource,
    accumulator: Arc<TurnAccumulator>,
    stop: Arc<AtomicBool>,
    poll_timeout: Duration,
    termination_grace: Duration,
    event_tx: Option<crossbeam_channel::Sender<SessionEvent>>,
    session_id: Arc<Mutex<Option<String>>>,
    audio_duration: Arc<Mutex<Option<f64>>>,
) {
    let mut drain_deadline: Option<tokio::time::Instant> = None;

    loop {
        if stop.load(Ordering::SeqCst) {
            // Intentional shutdown: keep reading briefly for the
            // Termination acknowledgment, then give up.
            let deadline = *drain_deadline
                .get_or_insert_with(|| tokio::time::Instant::now() + termination_grace);
            if tokio::time::Instant::now() >= deadline {
                break;
            }
        }

        let received = match timeout(poll_timeout, source.next()).await {
            // Bounded wait elapsed; loop back to observe the stop signal.
            Err(_) => continue,
            Ok(received) => received,
        };

        match received {
            None => {
                if !stop.load(Ordering::SeqCst) {
                    fault(&event_tx, &stop, "stream ended unexpectedly".to_string());
                }
                break;
            }
            Some(Err(e)) => {
                if !stop.load(Ordering::SeqCst) {
                    fault(&event_tx, &stop, format!("receive failed: {e}"));
                }
                break;
            }
            Some(Ok(Message::Text(text))) => {
                match InboundMessage::parse(&text) {
                    Some(InboundMessage::Begin { id, .. }) => {
                        info!(session_id = %id, "session began");
                        *lock(&session_id) = Some(id);
                    }
                    Some(InboundMessage::Turn {
                        transcript,
                        turn_is_formatted,
                        end_of_turn,
                    }) => {
                        accumulator.on_event(&TurnEvent {
                            text: transcript,
                            is_formatted: turn_is_formatted,
                            end_of_turn,
                        });
                    }
                    Some(InboundMessage::Termination {
                        audio_duration_seconds,
                    }) => {
                        *lock(&audio_duration) = audio_duration_seconds;
                        break;
                    }
                    None => debug!("ignoring unrecognized message: {text}"),
                }
            }
            Some(Ok(Message::Close(_))) => {
                if !stop.load(Ordering::SeqCst) {
                    fault(&event_tx, &stop, "service closed the connection".to_string());
                }
                break;
            }
            // Binary and control frames from the service carry no events.
            Some(Ok(_)) => {}
        }
    }
}

fn fault(
    event_tx: &Option<crossbeam_channel::Sender<SessionEvent>>,
    stop: &Arc<AtomicBool>,
    message: String,
) {
    warn!("receiver lane fault: {message}");
    emit(event_tx, SessionEvent::Faulted { message });
    // The fault unwinds the peer lane through the shared stop signal.
    stop.store(true, Ordering::SeqCst);
}
