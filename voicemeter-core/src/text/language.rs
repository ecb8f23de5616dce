//! Supported languages, hint parsing and marker-based detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{extract_words, lexicon};
use crate::report::LanguageDetection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "pt-BR")]
    PortugueseBr,
    #[serde(rename = "en-US")]
    EnglishUs,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::PortugueseBr => "pt-BR",
            Language::EnglishUs => "en-US",
        }
    }

    /// Short code for transcription engines (`pt`, `en`).
    pub fn iso_639_1(self) -> &'static str {
        match self {
            Language::PortugueseBr => "pt",
            Language::EnglishUs => "en",
        }
    }

    /// Lenient parse of a caller-supplied hint. Anything unrecognised is
    /// Brazilian Portuguese.
    pub fn from_hint(hint: &str) -> Self {
        match hint.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "english" | "ingles" | "inglês" => Language::EnglishUs,
            _ => Language::PortugueseBr,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Count marker words of each language. English wins only on a strict
/// majority of hits; no hits at all is Portuguese with full confidence.
pub fn detect_language(text: &str) -> LanguageDetection {
    let words = extract_words(text);
    let pt_markers = lexicon::markers(Language::PortugueseBr);
    let en_markers = lexicon::markers(Language::EnglishUs);

    let portuguese_score = words.iter().filter(|w| pt_markers.contains(w.as_str())).count();
    let english_score = words.iter().filter(|w| en_markers.contains(w.as_str())).count();
    let total = portuguese_score + english_score;

    let language = if english_score > portuguese_score {
        Language::EnglishUs
    } else {
        Language::PortugueseBr
    };
    let confidence = if total == 0 {
        1.0
    } else {
        portuguese_score.max(english_score) as f64 / total as f64
    };

    LanguageDetection {
        language,
        confidence,
        portuguese_score,
        english_score,
        from_hint: false,
    }
}

/// Detection record for a language fixed by the caller.
pub fn hinted(language: Language) -> LanguageDetection {
    LanguageDetection {
        language,
        confidence: 1.0,
        portuguese_score: 0,
        english_score: 0,
        from_hint: true,
    }
}
