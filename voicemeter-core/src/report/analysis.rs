//! Top-level analysis records.

use serde::{Deserialize, Serialize};

use super::{AcousticMetrics, TextComparisonResult, TranscriptAnalysis};
use crate::config::SpeakingProfile;
use crate::scoring::{feedback, ScoringPolicy};
use crate::text::Language;

/// The speaking profile an analysis was judged against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    pub ideal_min_wpm: f64,
    pub ideal_max_wpm: f64,
    pub is_within_range: bool,
}

impl ProfileSummary {
    pub fn new(profile: &SpeakingProfile, wpm: f64) -> Self {
        Self {
            key: profile.key.clone(),
            name: profile.name.clone(),
            description: profile.description.clone(),
            ideal_min_wpm: profile.min_wpm,
            ideal_max_wpm: profile.max_wpm,
            is_within_range: profile.contains(wpm),
        }
    }
}

/// Per-component sub-scores (0–100). Transcript-derived components are
/// `None` when no transcript or no expected text was available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    pub speech_rate: f64,
    pub pauses: f64,
    pub vocabulary: Option<f64>,
    pub fluency: Option<f64>,
    pub pronunciation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Language,
    Rate,
    Pauses,
    Pacing,
    Intelligibility,
    Vocabulary,
    Fluency,
    Pronunciation,
    Transcription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub message: String,
    pub severity: Severity,
    pub category: FeedbackCategory,
}

impl FeedbackItem {
    pub fn new(category: FeedbackCategory, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            category,
        }
    }
}

/// Everything one analysis request produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveAnalysisResult {
    pub profile: ProfileSummary,
    /// Language used for feedback and word tables.
    pub language: Language,
    pub acoustic: AcousticMetrics,
    pub transcript: Option<TranscriptAnalysis>,
    pub comparison: Option<TextComparisonResult>,
    /// Set when the transcriber failed or timed out; transcript fields are then `null`.
    pub transcription_error: Option<String>,
    pub scores: ComponentScores,
    pub scoring_policy: ScoringPolicy,
    pub overall_score: f64,
    pub feedback: Vec<FeedbackItem>,
    pub recommendations: Vec<String>,
}

impl ComprehensiveAnalysisResult {
    /// Flatten into the single-endpoint summary record.
    pub fn summary(&self) -> SpeechAnalysisSummary {
        SpeechAnalysisSummary::from_result(self)
    }
}

/// Flat, rounded record of the acoustic analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAnalysisSummary {
    pub category: String,
    pub words_per_minute: f64,
    pub speech_rate: f64,
    pub articulation_rate: f64,
    pub ideal_min_ppm: f64,
    pub ideal_max_ppm: f64,
    pub duration_seconds: f64,
    pub is_within_range: bool,
    pub active_speech_time: f64,
    pub silence_ratio: f64,
    pub pause_count: usize,
    pub avg_pause_duration: f64,
    pub pacing_consistency: f64,
    pub local_variation_detected: bool,
    pub intelligibility_score: f64,
    pub feedback: String,
    pub confidence: f64,
}

impl SpeechAnalysisSummary {
    pub fn from_result(result: &ComprehensiveAnalysisResult) -> Self {
        let acoustic = &result.acoustic;
        let rate = &acoustic.speech_rate;
        let profile = &result.profile;
        Self {
            category: profile.name.clone(),
            words_per_minute: round_to(rate.words_per_minute, 1),
            speech_rate: round_to(rate.speaking_rate, 1),
            articulation_rate: round_to(rate.articulation_rate, 1),
            ideal_min_ppm: profile.ideal_min_wpm,
            ideal_max_ppm: profile.ideal_max_wpm,
            duration_seconds: round_to(acoustic.duration_seconds, 2),
            is_within_range: profile.is_within_range,
            active_speech_time: round_to(rate.active_speech_seconds, 2),
            silence_ratio: round_to(acoustic.pauses.silence_ratio, 3),
            pause_count: acoustic.pauses.total_pauses,
            avg_pause_duration: round_to(acoustic.pauses.average_pause_duration, 2),
            pacing_consistency: round_to(acoustic.pacing.consistency_score, 1),
            local_variation_detected: acoustic.pacing.has_significant_variation,
            intelligibility_score: round_to(acoustic.intelligibility_score, 1),
            feedback: feedback::profile_rate_message(result.language, rate.words_per_minute, profile),
            confidence: round_to(acoustic.levels.confidence, 2),
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_keeps_requested_decimals() {
        assert_eq!(round_to(142.456, 1), 142.5);
        assert_eq!(round_to(0.12345, 2), 0.12);
        assert_eq!(round_to(-1.25, 0), -1.0);
    }

    #[test]
    fn profile_summary_checks_band() {
        let profile = SpeakingProfile {
            key: "pitch".into(),
            name: "Pitch".into(),
            description: String::new(),
            min_wpm: 120.0,
            max_wpm: 150.0,
        };
        assert!(ProfileSummary::new(&profile, 135.0).is_within_range);
        assert!(!ProfileSummary::new(&profile, 151.0).is_within_range);
    }

    #[test]
    fn feedback_item_serializes_lowercase_severity() {
        let item = FeedbackItem::new(FeedbackCategory::Pauses, Severity::Warning, "long pause");
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["category"], "pauses");
        assert_eq!(json["message"], "long pause");
    }
}
