//! Specialty keyterm sets for transcription biasing.
//!
//! The transcription service accepts a keyterm prompt list that biases
//! recognition toward domain vocabulary. Each specialty ships a curated set
//! of drug names, procedures, and exam terminology; users can append custom
//! terms per encounter.

use std::fmt;
use std::str::FromStr;

/// Medical specialty for an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Specialty {
    #[default]
    GeneralPractice,
    Cardiology,
    Endocrinology,
    Orthopedics,
    Psychiatry,
}

impl Specialty {
    /// All supported specialties, in display order.
    pub const ALL: [Specialty; 5] = [
        Specialty::GeneralPractice,
        Specialty::Cardiology,
        Specialty::Endocrinology,
        Specialty::Orthopedics,
        Specialty::Psychiatry,
    ];

    /// Human-readable name used in prompts and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::GeneralPractice => "General Practice",
            Specialty::Cardiology => "Cardiology",
            Specialty::Endocrinology => "Endocrinology",
            Specialty::Orthopedics => "Orthopedics",
            Specialty::Psychiatry => "Psychiatry",
        }
    }

    /// Curated keyterms for this specialty.
    pub fn keyterms(&self) -> &'static [&'static str] {
        match self {
            Specialty::GeneralPractice => &[
                "hypertension",
                "diabetes mellitus",
                "hyperlipidemia",
                "metformin",
                "lisinopril",
                "atorvastatin",
                "amlodipine",
                "hemoglobin A1c",
                "blood pressure",
                "BMI",
                "chief complaint",
                "review of systems",
                "auscultation",
                "palpation",
                "percussion",
                "vital signs",
                "ibuprofen",
                "acetaminophen",
                "amoxicillin",
                "prednisone",
            ],
            Specialty::Cardiology => &[
                "ejection fraction",
                "coronary artery disease",
                "ST elevation",
                "troponin",
                "echocardiogram",
                "electrocardiogram",
                "ECG",
                "atrial fibrillation",
                "heart failure",
                "stent",
                "angioplasty",
                "beta blocker",
                "metoprolol",
                "warfarin",
                "anticoagulation",
                "chest pain",
                "dyspnea",
                "palpitations",
                "myocardial infarction",
                "cardiac catheterization",
            ],
            Specialty::Endocrinology => &[
                "hemoglobin A1c",
                "insulin resistance",
                "thyroid",
                "levothyroxine",
                "TSH",
                "T3",
                "T4",
                "glucose tolerance",
                "diabetic neuropathy",
                "retinopathy",
                "metformin",
                "insulin glargine",
                "GLP-1 agonist",
                "semaglutide",
                "Hashimoto's thyroiditis",
                "Graves' disease",
                "adrenal insufficiency",
            ],
            Specialty::Orthopedics => &[
                "anterior cruciate ligament",
                "ACL",
                "meniscus",
                "arthroscopy",
                "MRI",
                "cortisone injection",
                "ibuprofen",
                "range of motion",
                "physical therapy",
                "fracture",
                "dislocation",
                "sprain",
                "rotator cuff",
                "carpal tunnel",
                "osteoarthritis",
                "bone density",
            ],
            Specialty::Psychiatry => &[
                "sertraline",
                "fluoxetine",
                "cognitive behavioral therapy",
                "major depressive disorder",
                "generalized anxiety",
                "SSRI",
                "SNRI",
                "benzodiazepine",
                "PHQ-9",
                "GAD-7",
                "bipolar disorder",
                "schizophrenia",
                "PTSD",
                "insomnia",
                "panic disorder",
                "suicidal ideation",
            ],
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = String;

    /// Parse a specialty from a display name or a dashed CLI form
    /// (e.g. "general-practice").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        Specialty::ALL
            .iter()
            .find(|sp| sp.as_str().to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown specialty: {s}"))
    }
}

/// Merge specialty keyterms with user-supplied comma-separated custom terms.
///
/// Custom terms are trimmed; empty entries are skipped. Order is preserved:
/// specialty terms first, custom terms after.
pub fn active_keyterms(specialty: Specialty, custom: &str) -> Vec<String> {
    let mut terms: Vec<String> = specialty.keyterms().iter().map(|t| t.to_string()).collect();
    terms.extend(
        custom
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    );
    terms
}
