//! Fluency heuristics: repeated words, near-miss self-corrections,
//! hesitations (long segment gaps) and fragmentary sentences.

use once_cell::sync::Lazy;
use regex::Regex;

use super::extract_words;
use super::matcher::string_ratio;
use crate::config::FluencyConfig;
use crate::report::FluencyMetrics;

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]").expect("static pattern"));

/// A sentence with fewer tokens than this counts as incomplete.
const COMPLETE_SENTENCE_TOKENS: usize = 3;

/// `hesitations` is the number of segment gaps at or above the hesitation
/// threshold; the rate is normalized per minute of `total_duration`.
pub fn analyze(
    text: &str,
    hesitations: usize,
    total_duration: f64,
    config: &FluencyConfig,
) -> FluencyMetrics {
    let words = extract_words(text);

    let repetition_count = words.windows(2).filter(|w| w[0] == w[1]).count();
    let self_corrections_count = words
        .windows(2)
        .filter(|w| w[0] != w[1])
        .filter(|w| {
            let ratio = string_ratio(&w[0], &w[1]);
            ratio > config.self_correction_min_similarity
                && ratio < config.self_correction_max_similarity
        })
        .count();
    let incomplete_sentences = count_incomplete_sentences(text);

    let hesitation_rate = if total_duration > 0.0 {
        hesitations as f64 / total_duration * 60.0
    } else {
        0.0
    };

    let (repetition_ratio, self_correction_ratio) = if words.is_empty() {
        (0.0, 0.0)
    } else {
        let n = words.len() as f64;
        (repetition_count as f64 / n, self_corrections_count as f64 / n)
    };

    let penalty = if words.is_empty() {
        0.0
    } else {
        repetition_ratio * config.repetition_weight
            + self_correction_ratio * config.self_correction_weight
            + hesitation_rate * config.hesitation_weight
            + incomplete_sentences as f64 * config.incomplete_sentence_weight
    };

    FluencyMetrics {
        fluency_score: (100.0 - penalty).clamp(0.0, 100.0),
        hesitation_count: hesitations,
        hesitation_rate,
        repetition_count,
        repetition_ratio,
        self_corrections_count,
        self_correction_ratio,
        incomplete_sentences,
    }
}

/// Non-empty sentences of one or two tokens.
pub fn count_incomplete_sentences(text: &str) -> usize {
    SENTENCE_END
        .split(text)
        .map(|s| s.split_whitespace().count())
        .filter(|&n| n > 0 && n < COMPLETE_SENTENCE_TOKENS)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(text: &str, hesitations: usize, duration: f64) -> FluencyMetrics {
        analyze(text, hesitations, duration, &FluencyConfig::default())
    }

    #[test]
    fn clean_speech_scores_full_marks() {
        let f = run("Hoje nós vamos falar sobre o projeto novo da equipe", 0, 10.0);
        assert_eq!(f.repetition_count, 0);
        assert_eq!(f.self_corrections_count, 0);
        assert_eq!(f.incomplete_sentences, 0);
        assert_relative_eq!(f.fluency_score, 100.0);
    }

    #[test]
    fn counts_immediate_repetitions() {
        let f = run("eu eu eu acho que sim", 0, 10.0);
        assert_eq!(f.repetition_count, 2);
        assert_relative_eq!(f.repetition_ratio, 2.0 / 6.0);
        assert_relative_eq!(f.fluency_score, 100.0 - 2.0 / 6.0 * 20.0, epsilon = 1e-9);
    }

    #[test]
    fn near_misses_are_self_corrections() {
        // ratio("roupa", "ropa") = 8/9 sits inside (0.5, 0.9).
        let f = run("a roupa ropa azul está ali", 0, 10.0);
        assert_eq!(f.self_corrections_count, 1);
        assert_eq!(f.repetition_count, 0);
    }

    #[test]
    fn hesitations_are_per_minute() {
        let f = run("uma fala com pausas longas no meio", 2, 30.0);
        assert_relative_eq!(f.hesitation_rate, 4.0);
        assert_eq!(f.hesitation_count, 2);
        assert_relative_eq!(f.fluency_score, 80.0);
    }

    #[test]
    fn fragments_count_as_incomplete() {
        assert_eq!(count_incomplete_sentences("Bom. Então vamos começar agora! Certo?"), 2);
        assert_eq!(count_incomplete_sentences("Uma frase inteira aqui."), 0);
        assert_eq!(count_incomplete_sentences(""), 0);
    }

    #[test]
    fn no_words_means_no_penalty() {
        let f = run("", 3, 0.0);
        assert_eq!(f.hesitation_rate, 0.0);
        assert_relative_eq!(f.fluency_score, 100.0);
    }

    #[test]
    fn score_is_clamped_at_zero() {
        let f = run("a. b. c. d. e. f. g. h. i. j. k. l. m. n. o. p. q. r. s. t. u. v. w. x. y. z. aa. bb. cc. dd. ee. ff. gg. hh.", 0, 10.0);
        assert_eq!(f.fluency_score, 0.0);
    }
}
