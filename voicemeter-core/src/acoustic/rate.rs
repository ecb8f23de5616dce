//! Speech rate (SR) and articulation rate (AR) from onsets and the VAD mask.
//!
//! Onsets stand in for syllables; a density-dependent syllables-per-word
//! factor turns them into words. The slow/fast clamps are guardrails against
//! onset mis-detection and are applied after the raw estimate.

use tracing::debug;

use super::{onset::OnsetSet, vad::VoiceActivityMask};
use crate::{
    config::RateConfig,
    report::{RateClassification, SpeechRateMetrics},
};

/// Syllables per word for a given onset density (onsets per second).
pub fn syllables_per_word(density: f64, cfg: &RateConfig) -> f64 {
    if density > cfg.very_dense_onsets_per_sec {
        cfg.very_dense_syllables_per_word
    } else if density > cfg.dense_onsets_per_sec {
        cfg.dense_syllables_per_word
    } else if density < cfg.sparse_onsets_per_sec {
        cfg.sparse_syllables_per_word
    } else {
        cfg.default_syllables_per_word
    }
}

/// Words per minute for `onset_count` syllables spoken over `duration_secs`.
pub fn words_per_minute(onset_count: usize, duration_secs: f64, syllables_per_word: f64) -> f64 {
    if onset_count == 0 || duration_secs <= 0.0 || syllables_per_word <= 0.0 {
        return 0.0;
    }
    (onset_count as f64 / syllables_per_word) / (duration_secs / 60.0)
}

/// Pre-clamp rate over the whole clip, with the density-adjusted factor.
pub fn raw_rate(onset_count: usize, duration_secs: f64, cfg: &RateConfig) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    let density = onset_count as f64 / duration_secs;
    words_per_minute(onset_count, duration_secs, syllables_per_word(density, cfg))
}

/// Plausibility clamp. Zero stays zero.
pub fn clamp_rate(rate: f64, onset_density: f64, ceiling: f64, cfg: &RateConfig) -> f64 {
    if rate <= 0.0 {
        rate
    } else if rate < cfg.slow_wpm_limit {
        let boost = if onset_density < cfg.sparse_boost_onsets_per_sec {
            cfg.sparse_slow_boost
        } else {
            cfg.slow_boost
        };
        rate * boost
    } else if rate > cfg.fast_wpm_limit {
        ceiling.min(rate * cfg.fast_damping)
    } else {
        rate
    }
}

pub fn classify(wpm: f64, cfg: &RateConfig) -> RateClassification {
    if wpm < cfg.too_slow_below_wpm {
        RateClassification::TooSlow
    } else if wpm < cfg.slow_below_wpm {
        RateClassification::Slow
    } else if wpm <= cfg.fast_above_wpm {
        RateClassification::Optimal
    } else if wpm <= cfg.too_fast_above_wpm {
        RateClassification::Fast
    } else {
        RateClassification::TooFast
    }
}

pub fn compute(onsets: &OnsetSet, mask: &VoiceActivityMask, cfg: &RateConfig) -> SpeechRateMetrics {
    let total = mask.total_duration;
    let active_secs = mask.active_duration();
    let active_ratio = mask.active_ratio();
    let onset_count = onsets.len();
    let density = onsets.density(total);
    let spw = syllables_per_word(density, cfg);

    let retained = onsets
        .times
        .iter()
        .filter(|t| mask.is_active(mask.time_to_frame(**t)))
        .count();
    let retention = if onset_count == 0 {
        1.0
    } else {
        retained as f64 / onset_count as f64
    };
    let hybrid_fallback = onset_count > 0
        && retention < cfg.hybrid_retention_ratio
        && active_ratio < cfg.hybrid_active_ratio;
    let ar_onsets = if hybrid_fallback { onset_count } else { retained };

    let sr_raw = words_per_minute(onset_count, total, spw);
    let ar_raw = words_per_minute(ar_onsets, active_secs, spw);
    let speaking_rate = clamp_rate(sr_raw, density, cfg.speech_rate_ceiling, cfg);
    let articulation_rate = clamp_rate(ar_raw, density, cfg.articulation_rate_ceiling, cfg);

    debug!(
        onset_count,
        retained,
        density,
        spw,
        hybrid_fallback,
        sr_raw,
        ar_raw,
        speaking_rate,
        articulation_rate,
        "speech rate computed"
    );

    SpeechRateMetrics {
        speaking_rate,
        articulation_rate,
        words_per_minute: articulation_rate,
        onset_count,
        retained_onsets: retained,
        onset_density: density,
        syllables_per_word: spw,
        active_speech_seconds: active_secs,
        total_duration_seconds: total,
        hybrid_fallback,
        classification: classify(articulation_rate, cfg),
    }
}
