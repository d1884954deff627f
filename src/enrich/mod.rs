//! Post-session enrichment: SOAP note, PII redaction, sentiment analysis.
//!
//! Three independent completion calls against the language-model service.
//! Failure of one never blocks or invalidates the others; a failing slot is
//! populated with an error placeholder instead.

pub mod client;
pub mod prompts;
pub mod sentiment;

pub use client::{
    CompletionBackend, CompletionRequest, HttpCompletionClient, MockCompletionBackend,
};
pub use sentiment::{Confidence, SentimentLabel, SentimentOutcome, SentimentReport};

use crate::keyterms::Specialty;
use tracing::warn;

/// Outcome of one enrichment task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    /// The task produced a result.
    Ready(T),
    /// The task failed; the placeholder message explains why.
    Failed { message: String },
}

impl<T> TaskOutcome<T> {
    /// True when the task produced a result.
    pub fn is_ready(&self) -> bool {
        matches!(self, TaskOutcome::Ready(_))
    }

    /// The result, if the task succeeded.
    pub fn value(&self) -> Option<&T> {
        match self {
            TaskOutcome::Ready(value) => Some(value),
            TaskOutcome::Failed { .. } => None,
        }
    }
}

/// Aggregate of the three enrichment results for a finished encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    /// Structured SOAP note.
    pub soap_note: TaskOutcome<String>,
    /// Transcript with PII replaced by bracketed labels.
    pub redacted_transcript: TaskOutcome<String>,
    /// Per-turn sentiment report (or the raw text when parsing failed).
    pub sentiment: TaskOutcome<SentimentOutcome>,
}

/// Runs the post-session enrichment calls.
pub struct Enricher<B: CompletionBackend> {
    backend: B,
}

impl<B: CompletionBackend> Enricher<B> {
    /// Creates an enricher over a completion backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Enriches a finalized transcript.
    ///
    /// The three calls run concurrently; each slot fails independently.
    pub async fn enrich(
        &self,
        transcript: &str,
        specialty: Specialty,
        patient_context: &str,
    ) -> SessionResult {
        let (soap_note, redacted_transcript, sentiment) = tokio::join!(
            self.generate_soap_note(transcript, specialty, patient_context),
            self.redact_pii(transcript),
            self.analyze_sentiment(transcript),
        );

        SessionResult {
            soap_note,
            redacted_transcript,
            sentiment,
        }
    }

    async fn generate_soap_note(
        &self,
        transcript: &str,
        specialty: Specialty,
        patient_context: &str,
    ) -> TaskOutcome<String> {
        let request = CompletionRequest {
            system_prompt: prompts::soap_note_prompt(specialty),
            user_content: prompts::soap_note_content(transcript, patient_context),
        };

        match self.backend.complete(&request).await {
            Ok(text) => TaskOutcome::Ready(text),
            Err(e) => {
                warn!("SOAP note generation failed: {e}");
                TaskOutcome::Failed {
                    message: format!("Error generating SOAP note: {e}"),
                }
            }
        }
    }

    async fn redact_pii(&self, transcript: &str) -> TaskOutcome<String> {
        let request = CompletionRequest {
            system_prompt: prompts::redaction_prompt().to_string(),
            user_content: prompts::transcript_content(transcript),
        };

        match self.backend.complete(&request).await {
            Ok(text) => TaskOutcome::Ready(text),
            Err(e) => {
                warn!("PII redaction failed: {e}");
                TaskOutcome::Failed {
                    message: format!("Error redacting PII: {e}"),
                }
            }
        }
    }

    async fn analyze_sentiment(&self, transcript: &str) -> TaskOutcome<SentimentOutcome> {
        let request = CompletionRequest {
            system_prompt: prompts::sentiment_prompt().to_string(),
            user_content: prompts::transcript_content(transcript),
        };

        match self.backend.complete(&request).await {
            Ok(raw) => TaskOutcome::Ready(SentimentOutcome::from_response(raw)),
            Err(e) => {
                warn!("sentiment analysis failed: {e}");
                TaskOutcome::Failed {
                    message: format!("Error analyzing sentiment: {e}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentiment_json() -> String {
        r#"{
            "turns": [
                {
                    "speaker": "Patient",
                    "excerpt": "I have been feeling much better",
                    "sentiment": "POSITIVE",
                    "confidence": "HIGH",
                    "reason": "Reports clear improvement."
                }
            ],
            "patient_summary": "The patient is optimistic about recovery.",
            "overall_patient_sentiment": "POSITIVE",
            "overall_doctor_sentiment": "NEUTRAL"
        }"#
        .to_string()
    }

    #[tokio::test]
    async fn test_all_three_tasks_succeed() {
        let backend = MockCompletionBackend::new()
            .with_response_for("SOAP", "## Subjective\nCough for three days.")
            .with_response_for("HIPAA", "Doctor: Hello [PERSON_NAME].")
            .with_response_for("sentiment", &sentiment_json());

        let enricher = Enricher::new(backend);
        let result = enricher
            .enrich("Doctor: Hello Bob.", Specialty::GeneralPractice, "")
            .await;

        assert!(result.soap_note.is_ready());
        assert!(result.redacted_transcript.is_ready());
        assert!(result.sentiment.is_ready());

        match result.sentiment.value().unwrap() {
            SentimentOutcome::Parsed(report) => {
                assert_eq!(report.turns.len(), 1);
                assert_eq!(report.overall_patient_sentiment, SentimentLabel::Positive);
            }
            SentimentOutcome::Unparsed { .. } => panic!("expected parsed sentiment"),
        }
    }

    #[tokio::test]
    async fn test_redaction_failure_leaves_other_slots_populated() {
        // Scenario: call 2 of 3 fails, calls 1 and 3 succeed
        let backend = MockCompletionBackend::new()
            .with_response_for("SOAP", "## Subjective\nHeadache.")
            .with_response_for("sentiment", &sentiment_json())
            .with_failure_for("HIPAA");

        let enricher = Enricher::new(backend);
        let result = enricher
            .enrich("Doctor: Hi.", Specialty::Cardiology, "")
            .await;

        assert!(result.soap_note.is_ready());
        assert!(result.sentiment.is_ready());

        match &result.redacted_transcript {
            TaskOutcome::Failed { message } => {
                assert!(message.contains("Error redacting PII"));
            }
            TaskOutcome::Ready(_) => panic!("expected redaction failure"),
        }
    }

    #[tokio::test]
    async fn test_all_tasks_fail_independently() {
        let backend = MockCompletionBackend::new().with_failure();
        let enricher = Enricher::new(backend);

        let result = enricher
            .enrich("Doctor: Hi.", Specialty::Psychiatry, "")
            .await;

        assert!(!result.soap_note.is_ready());
        assert!(!result.redacted_transcript.is_ready());
        assert!(!result.sentiment.is_ready());
    }

    #[tokio::test]
    async fn test_unparseable_sentiment_preserves_raw_text() {
        let backend = MockCompletionBackend::new()
            .with_response("The patient seemed anxious but cooperative.");

        let enricher = Enricher::new(backend);
        let result = enricher
            .enrich("Doctor: Hi.", Specialty::GeneralPractice, "")
            .await;

        // The call itself succeeded; only parsing failed
        match result.sentiment.value().unwrap() {
            SentimentOutcome::Unparsed { raw, error } => {
                assert!(raw.contains("anxious but cooperative"));
                assert!(!error.is_empty());
            }
            SentimentOutcome::Parsed(_) => panic!("expected unparsed outcome"),
        }
    }

    #[tokio::test]
    async fn test_specialty_reaches_soap_prompt() {
        let backend = MockCompletionBackend::new().with_response("note");
        let enricher = Enricher::new(backend);

        // Reaching here without panicking means prompt construction handled
        // the specialty; prompt content is covered in the prompts module.
        let result = enricher
            .enrich("Doctor: Hi.", Specialty::Orthopedics, "55yo, prior ACL tear")
            .await;
        assert!(result.soap_note.is_ready());
    }

    #[test]
    fn test_task_outcome_accessors() {
        let ready: TaskOutcome<String> = TaskOutcome::Ready("x".to_string());
        assert!(ready.is_ready());
        assert_eq!(ready.value(), Some(&"x".to_string()));

        let failed: TaskOutcome<String> = TaskOutcome::Failed {
            message: "nope".to_string(),
        };
        assert!(!failed.is_ready());
        assert_eq!(failed.value(), None);
    }
}
