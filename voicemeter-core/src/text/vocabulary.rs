//! Vocabulary richness over the extracted words of a transcript.

use std::collections::BTreeSet;
use std::collections::HashSet;

use super::{extract_words, lexicon, Language};
use crate::config::TextConfig;
use crate::report::{VocabularyLevel, VocabularyMetrics};

const MAX_LISTED_FILLERS: usize = 10;

pub fn analyze(text: &str, language: Language, config: &TextConfig) -> VocabularyMetrics {
    let words = extract_words(text);
    let total_words = words.len();
    if total_words == 0 {
        return VocabularyMetrics {
            total_words: 0,
            unique_words: 0,
            type_token_ratio: 0.0,
            average_word_length: 0.0,
            complex_words_count: 0,
            complex_words_ratio: 0.0,
            filler_words_count: 0,
            filler_words_ratio: 0.0,
            filler_words: Vec::new(),
            lexical_density: 0.0,
            level: VocabularyLevel::Basic,
        };
    }
    let total = total_words as f64;

    let unique_words = words.iter().collect::<HashSet<_>>().len();
    let type_token_ratio = unique_words as f64 / total;
    let average_word_length = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / total;

    let suffixes = lexicon::complex_suffixes(language);
    let complex_words_count = words
        .iter()
        .filter(|w| {
            w.chars().count() >= config.complex_word_min_length
                || suffixes.iter().any(|s| w.ends_with(*s))
        })
        .count();

    let filler_set = lexicon::fillers(language);
    let fillers: Vec<&String> = words.iter().filter(|w| filler_set.contains(w.as_str())).collect();
    let filler_words: Vec<String> = fillers
        .iter()
        .map(|w| w.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_LISTED_FILLERS)
        .collect();

    let content_words = words
        .iter()
        .filter(|w| lexicon::is_content_word(w, language))
        .count();

    VocabularyMetrics {
        total_words,
        unique_words,
        type_token_ratio,
        average_word_length,
        complex_words_count,
        complex_words_ratio: complex_words_count as f64 / total,
        filler_words_count: fillers.len(),
        filler_words_ratio: fillers.len() as f64 / total,
        filler_words,
        lexical_density: content_words as f64 / total,
        level: level_for(type_token_ratio),
    }
}

pub fn level_for(type_token_ratio: f64) -> VocabularyLevel {
    match type_token_ratio {
        r if r < 0.3 => VocabularyLevel::Basic,
        r if r < 0.5 => VocabularyLevel::Intermediate,
        r if r < 0.7 => VocabularyLevel::Advanced,
        _ => VocabularyLevel::Expert,
    }
}
