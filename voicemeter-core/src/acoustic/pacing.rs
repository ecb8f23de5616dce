//! Local pacing: how steady the articulation rate stays across the clip.

use super::onset::OnsetSet;
use crate::{config::PacingConfig, report::PacingVariation};

/// Slide a window of `window_onsets` onsets (50 % overlap) and compare the
/// local rates. `syllables_per_word` converts onsets to words.
pub fn analyze(onsets: &OnsetSet, syllables_per_word: f64, cfg: &PacingConfig) -> PacingVariation {
    let window = cfg.window_onsets.max(2);
    if onsets.len() < cfg.min_onsets.max(window) || syllables_per_word <= 0.0 {
        return PacingVariation::steady();
    }

    let step = (window / 2).max(1);
    let words_per_window = window as f64 / syllables_per_word;

    let local_rates: Vec<f64> = (0..=onsets.len().saturating_sub(window))
        .step_by(step)
        .filter_map(|i| {
            let span = &onsets.times[i..i + window];
            let duration = span[window - 1] - span[0];
            (duration > 0.0).then(|| words_per_window / (duration / 60.0))
        })
        .collect();

    if local_rates.is_empty() {
        return PacingVariation::steady();
    }

    let n = local_rates.len() as f64;
    let mean = local_rates.iter().sum::<f64>() / n;
    let variance = local_rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let variation_coefficient = if mean > 0.0 {
        variance.sqrt() / mean * 100.0
    } else {
        0.0
    };

    PacingVariation {
        consistency_score: (100.0 - cfg.consistency_slope * variation_coefficient).clamp(0.0, 100.0),
        variation_coefficient,
        has_significant_variation: variation_coefficient > cfg.significant_variation_pct,
        local_rates,
    }
}
