//! Append-only encounter transcript built from streamed turn events.
//!
//! The receiver lane writes events while the foreground reads snapshots, so
//! the accumulator guards its state with a single mutex. Turns are never
//! mutated or removed once appended.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Speaker role for a finalized turn.
///
/// Assignment alternates by turn ordinal: the clinician is assumed to open
/// the encounter. The transcription service's diarization could replace
/// this heuristic later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Clinician,
    Patient,
}

impl Speaker {
    /// Speaker for a given turn ordinal (even → clinician, odd → patient).
    pub fn for_ordinal(ordinal: usize) -> Self {
        if ordinal % 2 == 0 {
            Speaker::Clinician
        } else {
            Speaker::Patient
        }
    }

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Clinician => "Doctor",
            Speaker::Patient => "Patient",
        }
    }
}

/// One finalized utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Position in the transcript; equals the array index.
    pub ordinal: usize,
    /// Speaker assigned by ordinal parity.
    pub speaker: Speaker,
    /// Final formatted text.
    pub text: String,
}

/// A turn event received from the transcription service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEvent {
    /// Transcript text, possibly still changing.
    pub text: String,
    /// True once the service has finalized and formatted the turn.
    pub is_formatted: bool,
    /// True when the service detected the end of the turn.
    pub end_of_turn: bool,
}

/// Point-in-time view of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptSnapshot {
    /// Finalized turns in arrival order.
    pub turns: Vec<Turn>,
    /// In-progress text for the turn being spoken (display only).
    pub partial: String,
}

impl TranscriptSnapshot {
    /// True when nothing has been transcribed yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty() && self.partial.is_empty()
    }

    /// Total words across finalized turns.
    pub fn word_count(&self) -> usize {
        self.turns
            .iter()
            .map(|t| t.text.split_whitespace().count())
            .sum()
    }

    /// Renders the transcript as `Speaker: text` paragraphs.
    ///
    /// The pending partial is display-only and never rendered.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker.as_str(), t.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

struct AccumulatorState {
    turns: Vec<Turn>,
    partial: String,
}

/// Accumulates turn events into an ordered, append-only transcript.
pub struct TurnAccumulator {
    state: Mutex<AccumulatorState>,
}

impl TurnAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AccumulatorState {
                turns: Vec::new(),
                partial: String::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AccumulatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one event.
    ///
    /// A formatted event with non-empty text appends a turn and clears the
    /// pending partial; any other non-empty text replaces the partial.
    pub fn on_event(&self, event: &TurnEvent) {
        let text = event.text.trim();
        if text.is_empty() {
            return;
        }

        let mut state = self.lock();
        if event.is_formatted {
            let ordinal = state.turns.len();
            state.turns.push(Turn {
                ordinal,
                speaker: Speaker::for_ordinal(ordinal),
                text: text.to_string(),
            });
            state.partial.clear();
        } else {
            state.partial = text.to_string();
        }
    }

    /// Returns the current turns plus pending partial without mutating state.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        let state = self.lock();
        TranscriptSnapshot {
            turns: state.turns.clone(),
            partial: state.partial.clone(),
        }
    }

    /// Number of finalized turns.
    pub fn turn_count(&self) -> usize {
        self.lock().turns.len()
    }

    /// Discards all state for a fresh session.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.turns.clear();
        state.partial.clear();
    }
}

impl Default for TurnAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
