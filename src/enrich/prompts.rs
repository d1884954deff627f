//! Fixed instruction templates for the enrichment tasks.

use crate::keyterms::Specialty;

/// System instruction for SOAP note generation.
pub fn soap_note_prompt(specialty: Specialty) -> String {
    format!(
        "You are an expert medical scribe specializing in {}. \
Generate a structured SOAP note from this medical encounter transcript.

Format your response with these exact section headers:
## Subjective
Patient's chief complaint, history of present illness, review of systems, \
and relevant past medical/surgical/family/social history as reported by the patient.

## Objective
Provider observations, physical examination findings, vital signs, \
and diagnostic test results mentioned during the encounter.

## Assessment
Clinical impressions, differential diagnoses, and diagnostic reasoning.

## Plan
Treatment plan, medications prescribed (with dosages), \
follow-up instructions, referrals, and patient education provided.

Use appropriate medical terminology. Only include information explicitly \
stated in the transcript. Do not fabricate clinical data.",
        specialty.as_str()
    )
}

/// System instruction for PII redaction.
pub fn redaction_prompt() -> &'static str {
    "You are a HIPAA compliance specialist. Analyze the following medical \
encounter transcript and redact all personally identifiable information (PII).

Replace each PII instance with the appropriate label in brackets:
- Person names -> [PERSON_NAME]
- Dates of birth -> [DATE_OF_BIRTH]
- Phone numbers -> [PHONE_NUMBER]
- Email addresses -> [EMAIL_ADDRESS]
- Social security numbers -> [SSN]
- Medical record numbers -> [MRN]
- Addresses/locations -> [ADDRESS]
- Organizations/employers -> [ORGANIZATION]
- Insurance IDs -> [INSURANCE_ID]

Maintain ALL medical terminology, diagnoses, medications, and clinical details unchanged.
Only redact information that could identify a specific individual.
Return ONLY the redacted transcript, maintaining the exact same format with speaker labels."
}

/// System instruction for per-turn sentiment analysis.
pub fn sentiment_prompt() -> &'static str {
    r#"You are a clinical communication analyst. Analyze the sentiment of each speaker turn in this medical encounter transcript.

For each turn, assess the emotional tone. Then provide an overall summary.

Return your analysis as valid JSON with this exact structure:
{
  "turns": [
    {
      "speaker": "Doctor" or "Patient",
      "excerpt": "first 8-10 words of the turn...",
      "sentiment": "POSITIVE" or "NEUTRAL" or "NEGATIVE",
      "confidence": "HIGH" or "MEDIUM" or "LOW",
      "reason": "one sentence explanation"
    }
  ],
  "patient_summary": "2-3 sentence summary of patient's overall emotional state",
  "overall_patient_sentiment": "POSITIVE" or "NEUTRAL" or "NEGATIVE",
  "overall_doctor_sentiment": "POSITIVE" or "NEUTRAL" or "NEGATIVE"
}

Return ONLY valid JSON, no markdown code fences or other text."#
}

/// User content for the SOAP note call, with optional patient context.
pub fn soap_note_content(transcript: &str, patient_context: &str) -> String {
    if patient_context.trim().is_empty() {
        format!("Encounter Transcript:\n\n{transcript}")
    } else {
        format!(
            "Patient Context: {}\n\nEncounter Transcript:\n\n{transcript}",
            patient_context.trim()
        )
    }
}

/// User content for the redaction and sentiment calls.
pub fn transcript_content(transcript: &str) -> String {
    format!("Transcript:\n\n{transcript}")
}
