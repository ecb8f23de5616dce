//! Transcript-side analysis: normalization, tokenization and the analyzers
//! built on top of them.
//!
//! Two tokenizers serve different consumers:
//! - `normalize_text` / `tokenize` keep every `\w` run (digits included) and
//!   feed the text comparator.
//! - `extract_words` keeps only runs of the Portuguese alphabet and feeds the
//!   linguistic metrics (vocabulary, fluency, syllable rates).

pub mod compare;
pub mod fluency;
pub mod language;
pub mod lexicon;
pub mod matcher;
pub mod rate;
pub mod vocabulary;

pub use language::{detect_language, Language};

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("static pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static pattern"));
static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[a-záéíóúàèìòùâêîôûãõäëïöüç]+\b").expect("static pattern")
});

const VOWELS: &str = "aeiouáéíóúàèìòùâêîôûãõäëïöü";

/// Lowercase, drop punctuation, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Whitespace tokens of the normalized text.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_text(text)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Lowercased alphabetic words, punctuation and digits ignored.
pub fn extract_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Vowel-group count. Any non-empty word has at least one syllable.
pub fn count_syllables(word: &str) -> usize {
    let word = word.trim().to_lowercase();
    let mut letters = word.chars().filter(|c| c.is_alphanumeric() || *c == '_').peekable();
    if letters.peek().is_none() {
        return 0;
    }

    let mut syllables = 0;
    let mut prev_vowel = false;
    for c in letters {
        let vowel = VOWELS.contains(c);
        if vowel && !prev_vowel {
            syllables += 1;
        }
        prev_vowel = vowel;
    }
    syllables.max(1)
}

pub fn count_text_syllables(text: &str) -> usize {
    extract_words(text).iter().map(|w| count_syllables(w)).sum()
}
