//! Expected-vs-transcribed alignment.
//!
//! Whole-string similarity is measured on characters of the normalized
//! texts; missing, extra and mispronounced words come from an opcode walk of
//! the word-level matcher.

use super::matcher::{levenshtein, string_ratio, OpTag, SequenceMatcher};
use super::{normalize_text, Language};
use crate::config::TextConfig;
use crate::report::{MispronouncedWord, TextComparisonResult};

const ITEMIZE_MAX: usize = 3;
const MISPRONOUNCED_SHOWN: usize = 3;
const WORD_DELTA_NOTE: usize = 2;

#[derive(Debug, Default, PartialEq)]
struct WordDifferences {
    missing: Vec<String>,
    extra: Vec<String>,
    mispronounced: Vec<MispronouncedWord>,
}

pub fn compare_texts(
    expected: &str,
    transcribed: &str,
    language: Language,
    config: &TextConfig,
) -> TextComparisonResult {
    let expected_normalized = normalize_text(expected);
    let transcribed_normalized = normalize_text(transcribed);
    let expected_words: Vec<&str> = expected_normalized.split_whitespace().collect();
    let transcribed_words: Vec<&str> = transcribed_normalized.split_whitespace().collect();

    let similarity_ratio = string_ratio(&expected_normalized, &transcribed_normalized);
    let levenshtein_distance = levenshtein(&expected_normalized, &transcribed_normalized);
    let word_accuracy = word_accuracy(&expected_words, &transcribed_words);
    let differences = find_differences(
        &expected_words,
        &transcribed_words,
        config.mispronunciation_min_similarity,
    );
    let pronunciation_score = (similarity_ratio * 100.0).round();

    let feedback = comparison_feedback(
        language,
        pronunciation_score,
        &differences,
        expected_words.len(),
        transcribed_words.len(),
    );

    TextComparisonResult {
        expected_text: expected.to_owned(),
        transcribed_text: transcribed.to_owned(),
        expected_word_count: expected_words.len(),
        transcribed_word_count: transcribed_words.len(),
        expected_normalized,
        transcribed_normalized,
        similarity_ratio,
        pronunciation_score,
        word_accuracy,
        levenshtein_distance,
        missing_words: differences.missing,
        extra_words: differences.extra,
        mispronounced_words: differences.mispronounced,
        feedback,
    }
}

/// Matched words over expected words. An empty expectation is only met by an
/// empty transcription.
pub fn word_accuracy(expected: &[&str], transcribed: &[&str]) -> f64 {
    if expected.is_empty() {
        return if transcribed.is_empty() { 1.0 } else { 0.0 };
    }
    let matched = SequenceMatcher::new(expected, transcribed).matched();
    matched as f64 / expected.len() as f64
}

fn find_differences(expected: &[&str], transcribed: &[&str], min_similarity: f64) -> WordDifferences {
    let mut diff = WordDifferences::default();

    for op in SequenceMatcher::new(expected, transcribed).opcodes() {
        let expected_span = &expected[op.a_start..op.a_end];
        let transcribed_span = &transcribed[op.b_start..op.b_end];
        match op.tag {
            OpTag::Equal => {}
            OpTag::Delete => diff.missing.extend(expected_span.iter().map(|w| w.to_string())),
            OpTag::Insert => diff.extra.extend(transcribed_span.iter().map(|w| w.to_string())),
            OpTag::Replace => {
                for word in expected_span {
                    match best_candidate(word, transcribed_span) {
                        Some((heard, similarity)) if similarity > min_similarity => {
                            diff.mispronounced.push(MispronouncedWord {
                                expected: word.to_string(),
                                heard: heard.to_owned(),
                                similarity,
                            })
                        }
                        _ => diff.missing.push(word.to_string()),
                    }
                }
            }
        }
    }
    diff
}

/// Most similar candidate; the first one wins ties.
fn best_candidate<'a>(word: &str, candidates: &[&'a str]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for &candidate in candidates {
        let ratio = string_ratio(word, candidate);
        if ratio > best.map_or(0.0, |(_, r)| r) {
            best = Some((candidate, ratio));
        }
    }
    best
}

fn comparison_feedback(
    language: Language,
    score: f64,
    diff: &WordDifferences,
    expected_count: usize,
    transcribed_count: usize,
) -> Vec<String> {
    let en = language == Language::EnglishUs;
    let mut out = Vec::new();

    let band = if score >= 90.0 {
        if en {
            "Excellent! Your pronunciation is very close to the expected text."
        } else {
            "Excelente! Sua pronúncia está muito próxima do texto esperado."
        }
    } else if score >= 75.0 {
        if en {
            "Good job! Your pronunciation is close to the expected text."
        } else {
            "Bom trabalho! Sua pronúncia está bem próxima do texto esperado."
        }
    } else if score >= 50.0 {
        if en {
            "Fair. There is room to improve your pronunciation."
        } else {
            "Razoável. Há espaço para melhorias na pronúncia."
        }
    } else if en {
        "Keep practicing! Your pronunciation needs more attention."
    } else {
        "Continue praticando! A pronúncia precisa de mais atenção."
    };
    out.push(band.to_owned());

    if !diff.missing.is_empty() {
        let n = diff.missing.len();
        out.push(match (n <= ITEMIZE_MAX, en) {
            (true, true) => format!("Words not detected: {}", diff.missing.join(", ")),
            (true, false) => format!("Palavras não detectadas: {}", diff.missing.join(", ")),
            (false, true) => format!("{n} words were not detected."),
            (false, false) => format!("{n} palavras não foram detectadas."),
        });
    }

    for item in diff.mispronounced.iter().take(MISPRONOUNCED_SHOWN) {
        out.push(if en {
            format!("'{}' sounded like '{}'", item.expected, item.heard)
        } else {
            format!("'{}' soou como '{}'", item.expected, item.heard)
        });
    }

    if !diff.extra.is_empty() {
        let n = diff.extra.len();
        out.push(match (n <= ITEMIZE_MAX, en) {
            (true, true) => format!("Extra words detected: {}", diff.extra.join(", ")),
            (true, false) => format!("Palavras extras detectadas: {}", diff.extra.join(", ")),
            (false, true) => format!("{n} extra words were detected."),
            (false, false) => format!("{n} palavras extras foram detectadas."),
        });
    }

    let delta = transcribed_count.abs_diff(expected_count);
    if delta > WORD_DELTA_NOTE {
        let more = transcribed_count > expected_count;
        out.push(match (more, en) {
            (true, true) => format!("You said {delta} more words than expected."),
            (true, false) => format!("Você disse {delta} palavras a mais do que o esperado."),
            (false, true) => format!("You said {delta} fewer words than expected."),
            (false, false) => format!("Você disse {delta} palavras a menos do que o esperado."),
        });
    }

    out
}
