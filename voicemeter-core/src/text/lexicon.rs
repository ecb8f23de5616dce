//! Per-language word tables.
//!
//! Filler tables hold single tokens only; the analyzers work word by word.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::Language;

type WordSet = Lazy<HashSet<&'static str>>;

static PT_STOPWORDS: WordSet = Lazy::new(|| {
    [
        "a", "o", "e", "de", "da", "do", "que", "em", "um", "uma", "para", "com", "não", "nao",
        "se", "na", "os", "as", "dos", "das", "por", "mais", "foi", "são", "sao", "como", "mas",
        "ao", "ou", "ser", "seu", "sua", "quando", "muito", "nos", "já", "ja", "eu", "também",
        "tambem", "só", "so", "pelo", "pela", "até", "ate", "isso", "ela", "entre", "depois",
        "sem", "mesmo", "aos", "ter", "seus", "quem", "nas", "me", "esse", "eles", "você", "voce",
        "essa", "num", "nem", "suas", "meu", "às", "minha", "têm", "tem", "numa", "pelos", "elas",
        "havia", "seja", "qual", "será", "sera", "nós", "tenho", "lhe", "deles", "essas", "esses",
        "pelas", "este", "fosse", "dele", "tu", "te", "vocês", "voces", "lhes", "meus", "minhas",
        "teu", "tua", "teus", "tuas", "nosso", "nossa", "nossos", "nossas", "dela", "delas",
        "esta", "estes", "estas", "aquele", "aquela", "aqueles", "aquelas", "isto", "aquilo",
    ]
    .into_iter()
    .collect()
});

static EN_STOPWORDS: WordSet = Lazy::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do",
        "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can",
        "need", "dare", "ought", "used", "i", "you", "he", "she", "it", "we", "they", "me", "him",
        "her", "us", "them", "my", "your", "his", "its", "our", "their", "mine", "yours", "hers",
        "ours", "theirs", "this", "that", "these", "those", "what", "which", "who", "whom",
        "whose", "where", "when", "why", "how", "all", "each", "every", "both", "few", "more",
        "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
        "too", "very", "just", "also", "now", "here", "there", "then", "once",
    ]
    .into_iter()
    .collect()
});

static PT_FUNCTION_WORDS: WordSet = Lazy::new(|| {
    [
        "o", "a", "os", "as", "um", "uma", "uns", "umas", "de", "da", "do", "das", "dos", "em",
        "na", "no", "nas", "nos", "por", "para", "com", "sem", "sob", "sobre", "e", "ou", "mas",
        "porém", "contudo", "todavia", "que", "qual", "quais", "quem", "onde", "quando", "como",
        "eu", "tu", "ele", "ela", "nós", "vós", "eles", "elas", "me", "te", "se", "vos", "lhe",
        "lhes", "meu", "minha", "teu", "tua", "seu", "sua", "nosso", "nossa", "este", "esta",
        "esse", "essa", "aquele", "aquela", "isto", "isso", "aquilo", "ser", "estar", "ter",
        "haver", "é", "são", "foi", "foram", "será", "seria",
    ]
    .into_iter()
    .collect()
});

static PT_FILLERS: WordSet = Lazy::new(|| {
    [
        "é", "ã", "hum", "humm", "hummm", "eh", "ehh", "ehhh", "ah", "ahh", "ahhh", "ahn", "ãhn",
        "né", "ne", "sabe", "tipo", "assim", "então", "entao", "bom", "bem", "olha", "veja",
        "certo", "basicamente", "literalmente", "sinceramente", "honestamente", "obviamente",
        "claramente", "enfim", "aí", "ai", "daí", "dai",
    ]
    .into_iter()
    .collect()
});

static EN_FILLERS: WordSet = Lazy::new(|| {
    [
        "um", "umm", "ummm", "uh", "uhh", "uhhh", "ah", "ahh", "ahhh", "er", "err", "errr",
        "like", "right", "so", "well", "basically", "actually", "literally", "honestly",
        "obviously", "kinda", "sorta", "anyway", "anyways", "whatever", "whatnot",
    ]
    .into_iter()
    .collect()
});

static PT_MARKERS: WordSet = Lazy::new(|| {
    [
        "que", "não", "uma", "para", "com", "está", "isso", "mais", "como", "mas", "por",
        "muito", "também", "foi", "são", "tem", "seu", "sua", "ele", "ela", "você", "nós",
        "eles", "nosso", "esse", "essa", "aqui", "onde", "quando", "porque", "então", "até",
        "depois", "agora", "sempre", "ainda", "apenas", "sobre", "já", "fazer", "pode", "deve",
        "vai", "vou", "estou", "tinha", "seria", "podemos", "temos", "precisamos", "conseguimos",
    ]
    .into_iter()
    .collect()
});

static EN_MARKERS: WordSet = Lazy::new(|| {
    [
        "the", "and", "that", "have", "for", "not", "with", "you", "this", "but", "his", "from",
        "they", "were", "been", "their", "would", "there", "what", "about", "which", "when",
        "make", "can", "will", "more", "these", "want", "way", "could", "people", "than",
        "first", "who", "its", "now", "find", "because", "should", "think", "know", "going",
        "need", "really",
    ]
    .into_iter()
    .collect()
});

const PT_COMPLEX_SUFFIXES: &[&str] = &[
    "mente", "ção", "ções", "dade", "ismo", "ista", "ível", "ável", "ência", "ância", "mento",
    "tivo",
];

const EN_COMPLEX_SUFFIXES: &[&str] = &[
    "tion", "sion", "ness", "ment", "able", "ible", "ful", "less", "ous", "ive", "ity", "ism",
    "ist", "ology", "ical", "ally",
];

pub fn stopwords(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::PortugueseBr => &*PT_STOPWORDS,
        Language::EnglishUs => &*EN_STOPWORDS,
    }
}

/// Words that carry no lexical content. English has no separate table and
/// reuses its stopwords.
pub fn function_words(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::PortugueseBr => &*PT_FUNCTION_WORDS,
        Language::EnglishUs => &*EN_STOPWORDS,
    }
}

pub fn fillers(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::PortugueseBr => &*PT_FILLERS,
        Language::EnglishUs => &*EN_FILLERS,
    }
}

pub fn markers(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::PortugueseBr => &*PT_MARKERS,
        Language::EnglishUs => &*EN_MARKERS,
    }
}

pub fn complex_suffixes(language: Language) -> &'static [&'static str] {
    match language {
        Language::PortugueseBr => PT_COMPLEX_SUFFIXES,
        Language::EnglishUs => EN_COMPLEX_SUFFIXES,
    }
}

/// Not a stopword and not a function word.
pub fn is_content_word(word: &str, language: Language) -> bool {
    !stopwords(language).contains(word) && !function_words(language).contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_lowercase_single_tokens() {
        for lang in [Language::PortugueseBr, Language::EnglishUs] {
            for set in [stopwords(lang), function_words(lang), fillers(lang), markers(lang)] {
                for w in set.iter() {
                    assert!(!w.contains(' '), "{w}");
                    assert_eq!(w.to_lowercase(), *w);
                }
            }
        }
    }

    #[test]
    fn content_words_exclude_articles() {
        assert!(!is_content_word("o", Language::PortugueseBr));
        assert!(!is_content_word("sobre", Language::PortugueseBr));
        assert!(is_content_word("rato", Language::PortugueseBr));
        assert!(!is_content_word("the", Language::EnglishUs));
        assert!(is_content_word("mouse", Language::EnglishUs));
    }

    #[test]
    fn filler_tables_differ_per_language() {
        assert!(fillers(Language::PortugueseBr).contains("né"));
        assert!(!fillers(Language::EnglishUs).contains("né"));
        assert!(fillers(Language::EnglishUs).contains("like"));
    }
}
