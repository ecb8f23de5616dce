//! Analysis configuration.
//!
//! Every heuristic constant of the pipeline lives here as a named field so a
//! host (or a test) can retune it without touching the algorithms. Files are
//! plain JSON; missing keys fall back to the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AnalysisError, Result};
use crate::scoring::{ScoringPolicy, ScoringWeights};
use crate::text::Language;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AnalysisConfig {
    pub audio: AudioConfig,
    pub onset: OnsetConfig,
    pub vad: VadConfig,
    pub rate: RateConfig,
    pub pauses: PauseConfig,
    pub pacing: PacingConfig,
    pub intelligibility: IntelligibilityConfig,
    pub text: TextConfig,
    pub fluency: FluencyConfig,
    pub scoring: ScoringConfig,
    pub transcription: TranscriptionConfig,
    pub profiles: ProfileCatalog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AudioConfig {
    /// Every clip is resampled to this rate before analysis. Default: 22050.
    pub analysis_sample_rate: u32,
    /// Shorter clips are rejected. Default: 1.0 s.
    pub min_duration_secs: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            analysis_sample_rate: 22_050,
            min_duration_secs: 1.0,
        }
    }
}

/// Spectral-flux onset detection and peak picking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct OnsetConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    /// Dynamic range kept below the loudest mel bin.
    pub top_db: f32,
    pub pre_max_secs: f64,
    pub post_max_secs: f64,
    pub pre_avg_secs: f64,
    pub post_avg_secs: f64,
    /// Minimum height above the local mean (normalized envelope units).
    pub delta: f32,
    /// Minimum spacing between two onsets.
    pub wait_secs: f64,
    /// Move each onset back to the preceding envelope minimum.
    pub backtrack: bool,
    /// Clips whose peak amplitude stays below this are treated as silent.
    pub silence_peak_floor: f32,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            top_db: 80.0,
            pre_max_secs: 0.03,
            post_max_secs: 0.0,
            pre_avg_secs: 0.10,
            post_avg_secs: 0.10,
            delta: 0.07,
            wait_secs: 0.03,
            backtrack: true,
            silence_peak_floor: 1e-4,
        }
    }
}

/// Adaptive energy voice-activity detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct VadConfig {
    pub frame_length: usize,
    pub hop_length: usize,
    /// Lower RMS percentile (0–100). Default: 10.
    pub low_percentile: f64,
    /// Upper RMS percentile (0–100). Default: 90.
    pub high_percentile: f64,
    /// Threshold = low + fraction × (high − low). Default: 0.25.
    pub threshold_fraction: f32,
    /// When low ≥ ratio × high the clip has no silence contrast and every
    /// frame above `absolute_floor` counts as speech. Default: 0.5.
    pub continuous_ratio: f32,
    /// RMS below this is never speech. Default: 1e-4.
    pub absolute_floor: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
            low_percentile: 10.0,
            high_percentile: 90.0,
            threshold_fraction: 0.25,
            continuous_ratio: 0.5,
            absolute_floor: 1e-4,
        }
    }
}

/// Onset-to-word conversion, hybrid fallback and plausibility clamps.
///
/// The clamps are guardrails against onset mis-detection, not physical
/// limits. The hybrid thresholds were tuned by ear and want recalibration
/// against labelled recordings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RateConfig {
    /// Portuguese average. Used between the sparse and dense bands.
    pub default_syllables_per_word: f64,
    pub very_dense_onsets_per_sec: f64,
    pub very_dense_syllables_per_word: f64,
    pub dense_onsets_per_sec: f64,
    pub dense_syllables_per_word: f64,
    pub sparse_onsets_per_sec: f64,
    pub sparse_syllables_per_word: f64,

    /// Below this share of onsets inside active frames the VAD is suspect...
    pub hybrid_retention_ratio: f64,
    /// ...provided the clip is also mostly "silent" by the VAD's account.
    pub hybrid_active_ratio: f64,

    pub slow_wpm_limit: f64,
    /// Onset density under which the stronger slow boost applies.
    pub sparse_boost_onsets_per_sec: f64,
    pub sparse_slow_boost: f64,
    pub slow_boost: f64,
    pub fast_wpm_limit: f64,
    pub fast_damping: f64,
    pub speech_rate_ceiling: f64,
    pub articulation_rate_ceiling: f64,

    pub too_slow_below_wpm: f64,
    pub slow_below_wpm: f64,
    pub fast_above_wpm: f64,
    pub too_fast_above_wpm: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            default_syllables_per_word: 2.7,
            very_dense_onsets_per_sec: 4.0,
            very_dense_syllables_per_word: 1.8,
            dense_onsets_per_sec: 3.0,
            dense_syllables_per_word: 2.2,
            sparse_onsets_per_sec: 1.5,
            sparse_syllables_per_word: 3.0,
            hybrid_retention_ratio: 0.5,
            hybrid_active_ratio: 0.4,
            slow_wpm_limit: 50.0,
            sparse_boost_onsets_per_sec: 2.0,
            sparse_slow_boost: 2.0,
            slow_boost: 1.5,
            fast_wpm_limit: 250.0,
            fast_damping: 0.8,
            speech_rate_ceiling: 200.0,
            articulation_rate_ceiling: 220.0,
            too_slow_below_wpm: 100.0,
            slow_below_wpm: 140.0,
            fast_above_wpm: 180.0,
            too_fast_above_wpm: 220.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PauseConfig {
    /// Silence runs at or below this are not pauses. Default: 0.1 s.
    pub min_pause_secs: f64,
    pub short_below_secs: f64,
    pub medium_below_secs: f64,
    pub long_below_secs: f64,
    /// Transcript segment gaps below this are not pauses. Default: 0.25 s.
    pub segment_min_gap_secs: f64,
    /// Segment gaps at or above this count as hesitations. Default: 2.0 s.
    pub hesitation_gap_secs: f64,
    /// Longest acceptable single pause before feedback and scoring react.
    pub max_acceptable_pause_secs: f64,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            min_pause_secs: 0.1,
            short_below_secs: 0.5,
            medium_below_secs: 1.0,
            long_below_secs: 2.0,
            segment_min_gap_secs: 0.25,
            hesitation_gap_secs: 2.0,
            max_acceptable_pause_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PacingConfig {
    pub window_onsets: usize,
    /// Fewer onsets than this → not enough data, perfect consistency.
    pub min_onsets: usize,
    pub consistency_slope: f64,
    /// Coefficient of variation (%) above which variation is significant.
    pub significant_variation_pct: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            window_onsets: 15,
            min_onsets: 20,
            consistency_slope: 3.0,
            significant_variation_pct: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct IntelligibilityConfig {
    pub extreme_ar_wpm: f64,
    pub extreme_ar_factor: f64,
    pub very_fast_ar_wpm: f64,
    pub very_fast_ar_factor: f64,
    pub fast_ar_wpm: f64,
    pub fast_ar_factor: f64,
    pub slow_ar_wpm: f64,
    pub slow_ar_factor: f64,
    pub pacing_weight: f64,
    pub low_silence_ratio: f64,
    pub low_silence_factor: f64,
    pub high_silence_ratio: f64,
    pub high_silence_factor: f64,
}

impl Default for IntelligibilityConfig {
    fn default() -> Self {
        Self {
            extreme_ar_wpm: 400.0,
            extreme_ar_factor: 0.3,
            very_fast_ar_wpm: 250.0,
            very_fast_ar_factor: 0.6,
            fast_ar_wpm: 200.0,
            fast_ar_factor: 0.85,
            slow_ar_wpm: 80.0,
            slow_ar_factor: 0.9,
            pacing_weight: 0.3,
            low_silence_ratio: 0.10,
            low_silence_factor: 0.85,
            high_silence_ratio: 0.40,
            high_silence_factor: 0.90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct TextConfig {
    /// Forces the transcript language; `None` detects it from the text.
    pub language: Option<Language>,
    pub complex_word_min_length: usize,
    /// Best replacement candidate must be strictly above this to count as
    /// mispronounced rather than missing.
    pub mispronunciation_min_similarity: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            language: None,
            complex_word_min_length: 10,
            mispronunciation_min_similarity: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct FluencyConfig {
    pub self_correction_min_similarity: f64,
    pub self_correction_max_similarity: f64,
    pub repetition_weight: f64,
    pub self_correction_weight: f64,
    pub hesitation_weight: f64,
    pub incomplete_sentence_weight: f64,
}

impl Default for FluencyConfig {
    fn default() -> Self {
        Self {
            self_correction_min_similarity: 0.5,
            self_correction_max_similarity: 0.9,
            repetition_weight: 20.0,
            self_correction_weight: 15.0,
            hesitation_weight: 5.0,
            incomplete_sentence_weight: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScoringConfig {
    pub policy: ScoringPolicy,
    /// Only read when `policy` is `custom`.
    pub custom_weights: ScoringWeights,
    pub rate_penalty_per_wpm: f64,
    pub ideal_pause_ratio_min: f64,
    pub ideal_pause_ratio_max: f64,
    pub few_pauses_score: f64,
    pub excess_pause_slope: f64,
    pub long_pause_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            policy: ScoringPolicy::BalancedV1,
            custom_weights: ScoringPolicy::BalancedV1.weights(),
            rate_penalty_per_wpm: 2.0,
            ideal_pause_ratio_min: 0.10,
            ideal_pause_ratio_max: 0.25,
            few_pauses_score: 80.0,
            excess_pause_slope: 200.0,
            long_pause_penalty: 10.0,
        }
    }
}

impl ScoringConfig {
    /// Weights of the active policy.
    pub fn weights(&self) -> ScoringWeights {
        match self.policy {
            ScoringPolicy::Custom => self.custom_weights,
            policy => policy.weights(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Upper bound for one transcription call in the async entry point.
    pub timeout_secs: f64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self { timeout_secs: 120.0 }
    }
}

impl TranscriptionConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.timeout_secs.max(0.0))
    }
}

// ---------------------------------------------------------------------------
// Speaking profiles
// ---------------------------------------------------------------------------

/// A speaking context with its ideal words-per-minute band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakingProfile {
    pub key: String,
    pub name: String,
    pub description: String,
    pub min_wpm: f64,
    pub max_wpm: f64,
}

impl SpeakingProfile {
    fn new(key: &str, name: &str, description: &str, min_wpm: f64, max_wpm: f64) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            min_wpm,
            max_wpm,
        }
    }

    pub fn contains(&self, wpm: f64) -> bool {
        self.min_wpm <= wpm && wpm <= self.max_wpm
    }
}

/// Named speaking profiles. Lookup is by case-insensitive key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileCatalog(pub Vec<SpeakingProfile>);

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self(vec![
            SpeakingProfile::new(
                "presentation",
                "Apresentação",
                "Palestras e apresentações formais",
                140.0,
                160.0,
            ),
            SpeakingProfile::new(
                "pitch",
                "Pitch",
                "Vendas e apresentações de negócios",
                120.0,
                150.0,
            ),
            SpeakingProfile::new(
                "conversation",
                "Conversação Diária",
                "Conversas informais do dia a dia",
                100.0,
                130.0,
            ),
            SpeakingProfile::new(
                "other",
                "Outros",
                "Contextos personalizados",
                110.0,
                140.0,
            ),
        ])
    }
}

impl ProfileCatalog {
    /// # Errors
    /// `AnalysisError::UnknownProfile` when no profile has this key.
    pub fn get(&self, key: &str) -> Result<&SpeakingProfile> {
        let wanted = key.trim();
        self.0
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalysisError::UnknownProfile(wanted.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeakingProfile> {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Loading / normalization
// ---------------------------------------------------------------------------

impl AnalysisConfig {
    /// Parse a JSON document. Missing keys take their defaults.
    ///
    /// # Errors
    /// `AnalysisError::Json` on malformed input.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut config: AnalysisConfig = serde_json::from_str(raw)?;
        config.validate()?;
        config.normalize();
        Ok(config)
    }

    /// Reject what `normalize` cannot repair.
    ///
    /// # Errors
    /// `AnalysisError::InvalidConfig` for duplicate profile keys or custom
    /// weights that are negative or not finite.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for key in self.profiles.keys() {
            if !seen.insert(key.trim().to_lowercase()) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "duplicate speaking profile '{key}'"
                )));
            }
        }

        let w = &self.scoring.custom_weights;
        let weights = [w.speech_rate, w.pauses, w.vocabulary, w.fluency, w.pronunciation];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "custom scoring weights must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Strict file load.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Clamp out-of-range values back into something the pipeline can use.
    pub fn normalize(&mut self) {
        self.audio.analysis_sample_rate = self.audio.analysis_sample_rate.clamp(8_000, 96_000);
        self.audio.min_duration_secs = self.audio.min_duration_secs.max(0.0);

        self.onset.n_fft = self.onset.n_fft.clamp(256, 8192);
        self.onset.hop_length = self.onset.hop_length.clamp(64, self.onset.n_fft);
        self.onset.n_mels = self.onset.n_mels.clamp(8, 256);
        self.onset.top_db = self.onset.top_db.clamp(10.0, 200.0);
        self.onset.delta = self.onset.delta.clamp(0.0, 1.0);

        self.vad.frame_length = self.vad.frame_length.clamp(256, 8192);
        self.vad.hop_length = self.vad.hop_length.clamp(64, self.vad.frame_length);
        self.vad.low_percentile = self.vad.low_percentile.clamp(0.0, 100.0);
        self.vad.high_percentile = self
            .vad
            .high_percentile
            .clamp(self.vad.low_percentile, 100.0);
        self.vad.threshold_fraction = self.vad.threshold_fraction.clamp(0.0, 1.0);
        self.vad.continuous_ratio = self.vad.continuous_ratio.clamp(0.0, 1.0);

        self.rate.default_syllables_per_word = self.rate.default_syllables_per_word.max(0.5);
        self.rate.very_dense_syllables_per_word = self.rate.very_dense_syllables_per_word.max(0.5);
        self.rate.dense_syllables_per_word = self.rate.dense_syllables_per_word.max(0.5);
        self.rate.sparse_syllables_per_word = self.rate.sparse_syllables_per_word.max(0.5);
        self.rate.hybrid_retention_ratio = self.rate.hybrid_retention_ratio.clamp(0.0, 1.0);
        self.rate.hybrid_active_ratio = self.rate.hybrid_active_ratio.clamp(0.0, 1.0);

        self.pacing.window_onsets = self.pacing.window_onsets.max(2);
        self.pacing.min_onsets = self.pacing.min_onsets.max(self.pacing.window_onsets);

        if self.scoring.policy == ScoringPolicy::Custom && self.scoring.custom_weights.total() <= 0.0
        {
            warn!("custom scoring weights sum to zero, falling back to balanced_v1");
            self.scoring.policy = ScoringPolicy::BalancedV1;
        }

        if !self.transcription.timeout_secs.is_finite() {
            warn!("non-finite transcription timeout, using the default");
            self.transcription.timeout_secs = TranscriptionConfig::default().timeout_secs;
        }
        self.transcription.timeout_secs = self.transcription.timeout_secs.clamp(1.0, 3600.0);

        self.profiles.0.retain(|p| {
            let valid = !p.key.trim().is_empty() && p.min_wpm > 0.0 && p.min_wpm < p.max_wpm;
            if !valid {
                warn!(profile = p.key.as_str(), "dropping invalid speaking profile");
            }
            valid
        });
        if self.profiles.0.is_empty() {
            self.profiles = ProfileCatalog::default();
        }
    }

    /// Apply `VOICEMETER_*` environment overrides on top of file/default values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("VOICEMETER_SCORING_POLICY") {
            match ScoringPolicy::parse(&raw) {
                Some(policy) => self.scoring.policy = policy,
                None => warn!(value = raw.as_str(), "ignoring unknown VOICEMETER_SCORING_POLICY"),
            }
        }
        if let Ok(raw) = std::env::var("VOICEMETER_LANGUAGE") {
            let raw = raw.trim();
            self.text.language = if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
                None
            } else {
                Some(Language::from_hint(raw))
            };
        }
        if let Ok(raw) = std::env::var("VOICEMETER_TRANSCRIPTION_TIMEOUT_SECS") {
            match parse_timeout_secs(&raw) {
                Some(secs) => self.transcription.timeout_secs = secs,
                None => warn!(
                    value = raw.as_str(),
                    "ignoring invalid VOICEMETER_TRANSCRIPTION_TIMEOUT_SECS"
                ),
            }
        }
        self.normalize();
    }
}

/// Seconds from an environment value; `NaN` and infinities are rejected.
fn parse_timeout_secs(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lenient load: a missing, unreadable or invalid file yields the defaults.
pub fn load_config(path: &Path) -> AnalysisConfig {
    match AnalysisConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), "using default analysis config: {e}");
            AnalysisConfig::default()
        }
    }
}
