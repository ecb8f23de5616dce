//! Records produced by the transcript analyzers and the text comparator.

use serde::{Deserialize, Serialize};

use crate::text::Language;

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// An expected word that was heard as something close but different.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MispronouncedWord {
    pub expected: String,
    pub heard: String,
    /// Character similarity, strictly between 0.5 and 1.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextComparisonResult {
    pub expected_text: String,
    pub transcribed_text: String,
    pub expected_normalized: String,
    pub transcribed_normalized: String,
    pub similarity_ratio: f64,
    /// `round(similarity_ratio × 100)`.
    pub pronunciation_score: f64,
    pub word_accuracy: f64,
    pub levenshtein_distance: usize,
    pub expected_word_count: usize,
    pub transcribed_word_count: usize,
    pub missing_words: Vec<String>,
    pub extra_words: Vec<String>,
    pub mispronounced_words: Vec<MispronouncedWord>,
    pub feedback: Vec<String>,
}

// ---------------------------------------------------------------------------
// Vocabulary / fluency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyLevel {
    Basic,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyMetrics {
    pub total_words: usize,
    pub unique_words: usize,
    pub type_token_ratio: f64,
    pub average_word_length: f64,
    pub complex_words_count: usize,
    pub complex_words_ratio: f64,
    pub filler_words_count: usize,
    pub filler_words_ratio: f64,
    /// Distinct fillers heard, sorted, at most ten.
    pub filler_words: Vec<String>,
    pub lexical_density: f64,
    pub level: VocabularyLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluencyMetrics {
    pub fluency_score: f64,
    pub hesitation_count: usize,
    /// Long segment gaps per minute.
    pub hesitation_rate: f64,
    pub repetition_count: usize,
    pub repetition_ratio: f64,
    pub self_corrections_count: usize,
    pub self_correction_ratio: f64,
    pub incomplete_sentences: usize,
}

// ---------------------------------------------------------------------------
// Transcript rate / language
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRateClass {
    Slow,
    Medium,
    Fast,
}

/// Syllable-based rates measured on the transcript text and segment timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRateMetrics {
    pub total_words: usize,
    pub total_syllables: usize,
    /// Syllables per minute over the whole clip.
    pub speaking_rate_spm: f64,
    /// Syllables per minute with segment gaps removed.
    pub articulation_rate_spm: f64,
    pub words_per_minute: f64,
    pub speech_duration_seconds: f64,
    pub pause_duration_seconds: f64,
    pub classification: TranscriptRateClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDetection {
    pub language: Language,
    pub confidence: f64,
    pub portuguese_score: usize,
    pub english_score: usize,
    /// The language came from the caller or configuration, not detection.
    pub from_hint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptAnalysis {
    pub text: String,
    pub segment_count: usize,
    pub language: LanguageDetection,
    pub rate: TranscriptRateMetrics,
    pub vocabulary: VocabularyMetrics,
    pub fluency: FluencyMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_lowercase_names() {
        assert_eq!(
            serde_json::to_value(VocabularyLevel::Intermediate).expect("serialize"),
            "intermediate"
        );
        assert_eq!(
            serde_json::to_value(TranscriptRateClass::Medium).expect("serialize"),
            "medium"
        );
    }

    #[test]
    fn mispronounced_word_round_trips() {
        let word = MispronouncedWord {
            expected: "roupa".into(),
            heard: "ropa".into(),
            similarity: 0.89,
        };
        let json = serde_json::to_string(&word).expect("serialize");
        let back: MispronouncedWord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, word);
    }
}
