use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Words (with internal `-/.:'` joiners kept, so `12/05/2023` or `e-mail`
/// stay whole) or single punctuation characters.
static WORD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+(?:[-/.:']\w+)*|[^\w\s]").expect("WORD_TOKEN: invalid pattern")
});

/// Day-first or ISO-like dates. Anchored at the token start only: a token that
/// merely begins with a date (`12/05/2023-backup`) matches as well.
static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,2}[-/]\d{1,2}[-/]\d{2,4}|\d{4}[-/]\d{1,2}[-/]\d{1,2})\b")
        .expect("DATE_PREFIX: invalid pattern")
});

/// Split raw text into word-level tokens, punctuation separated out.
pub fn word_tokenize(text: &str) -> Vec<&str> {
    WORD_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Split already-cleaned text on Unicode word boundaries.
pub fn words(text: &str) -> Vec<&str> {
    text.unicode_words().collect()
}

pub fn is_date(token: &str) -> bool {
    DATE_PREFIX.is_match(token)
}

/// True for non-empty tokens made only of digits.
pub fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_numeric)
}

/// Remove every ASCII punctuation character.
pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}
