//! Sentiment report types and lenient response parsing.
//!
//! The sentiment task asks for strict JSON, but completion models sometimes
//! wrap responses in markdown code fences. Parsing strips fences first and
//! preserves the raw text when the body still doesn't match the schema.

use serde::{Deserialize, Serialize};

/// Sentiment label for a turn or a speaker overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Model confidence for one judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Sentiment judgment for a single turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSentiment {
    pub speaker: String,
    pub excerpt: String,
    pub sentiment: SentimentLabel,
    pub confidence: Confidence,
    #[serde(default)]
    pub reason: String,
}

/// Full sentiment report for an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    #[serde(default)]
    pub turns: Vec<TurnSentiment>,
    #[serde(default)]
    pub patient_summary: String,
    pub overall_patient_sentiment: SentimentLabel,
    pub overall_doctor_sentiment: SentimentLabel,
}

/// Result of interpreting a sentiment response.
#[derive(Debug, Clone, PartialEq)]
pub enum SentimentOutcome {
    /// The response matched the documented schema.
    Parsed(SentimentReport),
    /// The response text is preserved for manual inspection.
    Unparsed { raw: String, error: String },
}

impl SentimentOutcome {
    /// Interprets a completion response, tolerating markdown fences.
    pub fn from_response(raw: String) -> Self {
        let body = strip_code_fences(&raw);
        match serde_json::from_str::<SentimentReport>(body) {
            Ok(report) => SentimentOutcome::Parsed(report),
            Err(e) => SentimentOutcome::Unparsed {
                raw,
                error: e.to_string(),
            },
        }
    }
}

/// Strips a surrounding markdown code fence (```/```json) if present.
fn strip_code_fences(raw: &str) -> &str {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop the fence line itself (may carry a language tag)
        body = match rest.split_once('\n') {
            Some((_, after)) => after,
            None => rest,
        };
        body = body.trim_end();
        if let Some(stripped) = body.strip_suffix("```") {
            body = stripped;
        }
    }
    body.trim()
}
