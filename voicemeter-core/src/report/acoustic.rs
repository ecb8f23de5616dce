//! Records produced by the acoustic analyzers.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rate
// ---------------------------------------------------------------------------

/// Coarse speaking-rate band from fixed WPM thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateClassification {
    TooSlow,
    Slow,
    Optimal,
    Fast,
    TooFast,
}

impl RateClassification {
    pub fn as_str(self) -> &'static str {
        match self {
            RateClassification::TooSlow => "too_slow",
            RateClassification::Slow => "slow",
            RateClassification::Optimal => "optimal",
            RateClassification::Fast => "fast",
            RateClassification::TooFast => "too_fast",
        }
    }
}

/// Speech rate (SR, over total time) and articulation rate (AR, over active
/// speech only). The two are independent estimates; AR ≥ SR does not
/// necessarily hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRateMetrics {
    pub speaking_rate: f64,
    pub articulation_rate: f64,
    /// Same value as `articulation_rate`; the figure compared against profiles.
    pub words_per_minute: f64,
    pub onset_count: usize,
    /// Onsets that fall on an active VAD frame.
    pub retained_onsets: usize,
    pub onset_density: f64,
    pub syllables_per_word: f64,
    pub active_speech_seconds: f64,
    pub total_duration_seconds: f64,
    /// AR was computed from all onsets because the VAD looked too aggressive.
    pub hybrid_fallback: bool,
    pub classification: RateClassification,
}

// ---------------------------------------------------------------------------
// Pauses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseSegment {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseMetrics {
    pub total_pauses: usize,
    pub short_pauses: usize,
    pub medium_pauses: usize,
    pub long_pauses: usize,
    pub extended_pauses: usize,
    pub total_pause_duration: f64,
    pub average_pause_duration: f64,
    pub longest_pause: f64,
    pub pauses_per_minute: f64,
    /// Pause time over total time, in [0, 1].
    pub pause_ratio: f64,
    /// 1 − active ratio of the VAD mask, in [0, 1].
    pub silence_ratio: f64,
    pub segments: Vec<PauseSegment>,
}

// ---------------------------------------------------------------------------
// Pacing / levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacingVariation {
    /// 0–100; 100 means a perfectly steady local rate.
    pub consistency_score: f64,
    /// Coefficient of variation of the local rates, in percent.
    pub variation_coefficient: f64,
    pub has_significant_variation: bool,
    /// Words per minute for each onset window.
    pub local_rates: Vec<f64>,
}

impl PacingVariation {
    /// Result for clips with too few onsets to judge rhythm.
    pub fn steady() -> Self {
        Self {
            consistency_score: 100.0,
            variation_coefficient: 0.0,
            has_significant_variation: false,
            local_rates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelMetrics {
    /// Percentage of frames louder than a fifth of the peak frame.
    pub confidence: f64,
    pub min_db: f32,
    pub max_db: f32,
    pub avg_db: f32,
    /// Down-sampled loudness curve (dBFS), at most 50 points.
    pub envelope_db: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcousticMetrics {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub speech_rate: SpeechRateMetrics,
    pub pauses: PauseMetrics,
    pub pacing: PacingVariation,
    pub intelligibility_score: f64,
    pub levels: LevelMetrics,
}
