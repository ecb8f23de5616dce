//! Component sub-scores and their weighted combination.
//!
//! Every analyzer runs with exactly one `ScoringPolicy`. Components that are
//! unavailable for a request (no transcript, no expected text) are dropped
//! and the remaining weights renormalized, so the overall score is always a
//! weighted mean on the 0–100 scale.

pub mod feedback;

use serde::{Deserialize, Serialize};

use crate::config::{ScoringConfig, SpeakingProfile};
use crate::report::{
    ComponentScores, PauseMetrics, TextComparisonResult, TranscriptAnalysis, VocabularyMetrics,
};

/// Named, versioned weighting schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Rate, pauses, vocabulary and fluency; pronunciation ignored.
    #[default]
    BalancedV1,
    /// Pronunciation-first, for read-aloud exercises with expected text.
    PronunciationV2,
    /// Weights taken from `ScoringConfig::custom_weights`.
    Custom,
}

impl ScoringPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringPolicy::BalancedV1 => "balanced_v1",
            ScoringPolicy::PronunciationV2 => "pronunciation_v2",
            ScoringPolicy::Custom => "custom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "balanced_v1" | "balanced" => Some(ScoringPolicy::BalancedV1),
            "pronunciation_v2" | "pronunciation" => Some(ScoringPolicy::PronunciationV2),
            "custom" => Some(ScoringPolicy::Custom),
            _ => None,
        }
    }

    /// Built-in weights. `Custom` has none of its own and returns zeros.
    pub fn weights(self) -> ScoringWeights {
        match self {
            ScoringPolicy::BalancedV1 => ScoringWeights {
                speech_rate: 0.25,
                pauses: 0.15,
                vocabulary: 0.25,
                fluency: 0.35,
                pronunciation: 0.0,
            },
            ScoringPolicy::PronunciationV2 => ScoringWeights {
                speech_rate: 0.20,
                pauses: 0.10,
                vocabulary: 0.15,
                fluency: 0.20,
                pronunciation: 0.35,
            },
            ScoringPolicy::Custom => ScoringWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScoringWeights {
    pub speech_rate: f64,
    pub pauses: f64,
    pub vocabulary: f64,
    pub fluency: f64,
    pub pronunciation: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.speech_rate + self.pauses + self.vocabulary + self.fluency + self.pronunciation
    }
}

/// 100 inside the profile band, minus `rate_penalty_per_wpm` per WPM outside.
pub fn rate_score(wpm: f64, profile: &SpeakingProfile, config: &ScoringConfig) -> f64 {
    let distance = if wpm < profile.min_wpm {
        profile.min_wpm - wpm
    } else if wpm > profile.max_wpm {
        wpm - profile.max_wpm
    } else {
        0.0
    };
    (100.0 - distance * config.rate_penalty_per_wpm).max(0.0)
}

pub fn pause_score(pauses: &PauseMetrics, max_acceptable_pause: f64, config: &ScoringConfig) -> f64 {
    let ratio = pauses.pause_ratio;
    let mut score = if ratio < config.ideal_pause_ratio_min {
        config.few_pauses_score
    } else if ratio <= config.ideal_pause_ratio_max {
        100.0
    } else {
        (100.0 - (ratio - config.ideal_pause_ratio_max) * config.excess_pause_slope).max(0.0)
    };
    if pauses.longest_pause > max_acceptable_pause {
        score -= config.long_pause_penalty;
    }
    score.max(0.0)
}

/// Rewards lexical variety and some complex vocabulary, penalizes fillers.
pub fn vocabulary_score(vocabulary: &VocabularyMetrics) -> f64 {
    let score = 50.0 + vocabulary.type_token_ratio * 30.0
        + (vocabulary.complex_words_ratio * 50.0).min(15.0)
        - vocabulary.filler_words_ratio * 50.0;
    score.clamp(0.0, 100.0)
}

/// Sub-scores for everything available to this request.
pub fn component_scores(
    wpm: f64,
    pauses: &PauseMetrics,
    max_acceptable_pause: f64,
    profile: &SpeakingProfile,
    transcript: Option<&TranscriptAnalysis>,
    comparison: Option<&TextComparisonResult>,
    config: &ScoringConfig,
) -> ComponentScores {
    ComponentScores {
        speech_rate: rate_score(wpm, profile, config),
        pauses: pause_score(pauses, max_acceptable_pause, config),
        vocabulary: transcript.map(|t| vocabulary_score(&t.vocabulary)),
        fluency: transcript.map(|t| t.fluency.fluency_score),
        pronunciation: comparison.map(|c| c.pronunciation_score),
    }
}

/// Weighted mean over the present components. When every present component
/// has zero weight the plain mean is used instead.
pub fn overall(scores: &ComponentScores, weights: &ScoringWeights) -> f64 {
    let parts = [
        (Some(scores.speech_rate), weights.speech_rate),
        (Some(scores.pauses), weights.pauses),
        (scores.vocabulary, weights.vocabulary),
        (scores.fluency, weights.fluency),
        (scores.pronunciation, weights.pronunciation),
    ];
    let present: Vec<(f64, f64)> = parts
        .iter()
        .filter_map(|(score, weight)| score.map(|s| (s, weight.max(0.0))))
        .collect();

    let weight_sum: f64 = present.iter().map(|(_, w)| w).sum();
    let combined = if weight_sum > 0.0 {
        present.iter().map(|(s, w)| s * w).sum::<f64>() / weight_sum
    } else {
        present.iter().map(|(s, _)| s).sum::<f64>() / present.len() as f64
    };
    combined.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{VocabularyLevel, VocabularyMetrics};
    use approx::assert_relative_eq;

    fn profile() -> SpeakingProfile {
        SpeakingProfile {
            key: "presentation".into(),
            name: "Apresentação".into(),
            description: String::new(),
            min_wpm: 140.0,
            max_wpm: 160.0,
        }
    }

    fn pauses(ratio: f64, longest: f64) -> PauseMetrics {
        PauseMetrics {
            pause_ratio: ratio,
            longest_pause: longest,
            ..PauseMetrics::default()
        }
    }

    fn vocabulary(ttr: f64, complex: f64, filler: f64) -> VocabularyMetrics {
        VocabularyMetrics {
            total_words: 10,
            unique_words: 10,
            type_token_ratio: ttr,
            average_word_length: 5.0,
            complex_words_count: 0,
            complex_words_ratio: complex,
            filler_words_count: 0,
            filler_words_ratio: filler,
            filler_words: Vec::new(),
            lexical_density: 0.5,
            level: VocabularyLevel::Advanced,
        }
    }

    #[test]
    fn policy_weights_sum_to_one() {
        for policy in [ScoringPolicy::BalancedV1, ScoringPolicy::PronunciationV2] {
            assert_relative_eq!(policy.weights().total(), 1.0, epsilon = 1e-12);
        }
        assert_eq!(ScoringPolicy::Custom.weights().total(), 0.0);
    }

    #[test]
    fn policy_names_parse_and_serialize() {
        assert_eq!(ScoringPolicy::parse(" Pronunciation-V2 "), Some(ScoringPolicy::PronunciationV2));
        assert_eq!(ScoringPolicy::parse("balanced"), Some(ScoringPolicy::BalancedV1));
        assert_eq!(ScoringPolicy::parse("nope"), None);
        assert_eq!(
            serde_json::to_value(ScoringPolicy::BalancedV1).expect("serialize"),
            ScoringPolicy::BalancedV1.as_str()
        );
    }

    #[test]
    fn rate_score_penalizes_distance_from_band() {
        let cfg = ScoringConfig::default();
        assert_eq!(rate_score(150.0, &profile(), &cfg), 100.0);
        assert_eq!(rate_score(130.0, &profile(), &cfg), 80.0);
        assert_eq!(rate_score(170.0, &profile(), &cfg), 80.0);
        assert_eq!(rate_score(10.0, &profile(), &cfg), 0.0);
    }

    #[test]
    fn pause_score_bands() {
        let cfg = ScoringConfig::default();
        assert_eq!(pause_score(&pauses(0.2, 1.0), 3.0, &cfg), 100.0);
        assert_eq!(pause_score(&pauses(0.05, 1.0), 3.0, &cfg), 80.0);
        assert_relative_eq!(pause_score(&pauses(0.35, 1.0), 3.0, &cfg), 80.0, epsilon = 1e-9);
        assert_relative_eq!(pause_score(&pauses(0.2, 4.0), 3.0, &cfg), 90.0);
        assert_eq!(pause_score(&pauses(0.9, 4.0), 3.0, &cfg), 0.0);
    }

    #[test]
    fn vocabulary_score_formula() {
        assert_relative_eq!(vocabulary_score(&vocabulary(0.5, 0.1, 0.0)), 70.0);
        // Complex bonus caps at 15.
        assert_relative_eq!(vocabulary_score(&vocabulary(1.0, 0.9, 0.0)), 95.0);
        assert_relative_eq!(vocabulary_score(&vocabulary(0.0, 0.0, 1.0)), 0.0);
    }

    #[test]
    fn missing_components_renormalize() {
        let scores = ComponentScores {
            speech_rate: 80.0,
            pauses: 60.0,
            vocabulary: None,
            fluency: None,
            pronunciation: None,
        };
        // (80 × 0.25 + 60 × 0.15) / 0.40
        assert_relative_eq!(
            overall(&scores, &ScoringPolicy::BalancedV1.weights()),
            72.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn full_balanced_score_matches_weighted_sum() {
        let scores = ComponentScores {
            speech_rate: 100.0,
            pauses: 80.0,
            vocabulary: Some(70.0),
            fluency: Some(90.0),
            pronunciation: Some(10.0),
        };
        let expected = 100.0 * 0.25 + 80.0 * 0.15 + 70.0 * 0.25 + 90.0 * 0.35;
        assert_relative_eq!(
            overall(&scores, &ScoringPolicy::BalancedV1.weights()),
            expected,
            epsilon = 1e-9
        );
        let v2 = 100.0 * 0.20 + 80.0 * 0.10 + 70.0 * 0.15 + 90.0 * 0.20 + 10.0 * 0.35;
        assert_relative_eq!(
            overall(&scores, &ScoringPolicy::PronunciationV2.weights()),
            v2,
            epsilon = 1e-9
        );
    }

    #[test]
    fn zero_weighted_components_fall_back_to_mean() {
        let scores = ComponentScores {
            speech_rate: 50.0,
            pauses: 100.0,
            vocabulary: None,
            fluency: None,
            pronunciation: None,
        };
        let weights = ScoringWeights {
            pronunciation: 1.0,
            ..ScoringWeights::default()
        };
        assert_relative_eq!(overall(&scores, &weights), 75.0);
    }
}
