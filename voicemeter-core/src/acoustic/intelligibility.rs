use crate::config::IntelligibilityConfig;

/// Clarity estimate in [0, 100] from articulation rate, pacing consistency
/// and silence ratio. Each out-of-range input multiplies in a penalty.
pub fn estimate(
    articulation_rate: f64,
    consistency_score: f64,
    silence_ratio: f64,
    cfg: &IntelligibilityConfig,
) -> f64 {
    let mut score = 100.0;

    if articulation_rate > cfg.extreme_ar_wpm {
        score *= cfg.extreme_ar_factor;
    } else if articulation_rate > cfg.very_fast_ar_wpm {
        score *= cfg.very_fast_ar_factor;
    } else if articulation_rate > cfg.fast_ar_wpm {
        score *= cfg.fast_ar_factor;
    } else if articulation_rate < cfg.slow_ar_wpm {
        score *= cfg.slow_ar_factor;
    }

    let inconsistency = (100.0 - consistency_score.clamp(0.0, 100.0)) / 100.0;
    score *= 1.0 - cfg.pacing_weight * inconsistency;

    if silence_ratio < cfg.low_silence_ratio {
        score *= cfg.low_silence_factor;
    } else if silence_ratio > cfg.high_silence_ratio {
        score *= cfg.high_silence_factor;
    }

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn score(ar: f64, consistency: f64, silence: f64) -> f64 {
        estimate(ar, consistency, silence, &IntelligibilityConfig::default())
    }

    #[test]
    fn ideal_delivery_scores_full() {
        assert_relative_eq!(score(150.0, 100.0, 0.2), 100.0);
    }

    #[test]
    fn rate_extremes_are_penalized() {
        assert_relative_eq!(score(450.0, 100.0, 0.2), 30.0);
        assert_relative_eq!(score(300.0, 100.0, 0.2), 60.0);
        assert_relative_eq!(score(210.0, 100.0, 0.2), 85.0);
        assert_relative_eq!(score(60.0, 100.0, 0.2), 90.0);
    }

    #[test]
    fn no_silence_costs_fifteen_percent() {
        assert_relative_eq!(score(150.0, 100.0, 0.0), 85.0);
        assert_relative_eq!(score(150.0, 100.0, 0.5), 90.0);
    }

    #[test]
    fn inconsistent_pacing_costs_up_to_thirty_percent() {
        assert_relative_eq!(score(150.0, 0.0, 0.2), 70.0);
        assert_relative_eq!(score(150.0, 50.0, 0.2), 85.0);
    }

    #[test]
    fn penalties_compound_and_stay_in_range() {
        let s = score(500.0, 0.0, 0.9);
        assert_relative_eq!(s, 100.0 * 0.3 * 0.7 * 0.9, epsilon = 1e-9);
        assert!((0.0..=100.0).contains(&s));
    }
}
