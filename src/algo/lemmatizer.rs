use std::collections::HashMap;

use rust_stemmers::{Algorithm, Stemmer};

/// Irregular inflections that no suffix rule can undo.
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("data", "datum"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("diagnoses", "diagnosis"),
    ("went", "go"),
    ("gone", "go"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("did", "do"),
    ("done", "do"),
    ("had", "have"),
    ("made", "make"),
    ("sent", "send"),
    ("got", "get"),
    ("gotten", "get"),
    ("ran", "run"),
    ("broke", "break"),
    ("broken", "break"),
    ("froze", "freeze"),
    ("frozen", "freeze"),
    ("lost", "lose"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("wrote", "write"),
    ("written", "write"),
    ("took", "take"),
    ("taken", "take"),
    ("began", "begin"),
    ("begun", "begin"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("devices", "device"),
    ("services", "service"),
    ("licenses", "license"),
    ("licences", "licence"),
    ("passwords", "password"),
];

/// Plural endings and their singular replacement, longest first.
const NOUN_SUFFIXES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zes", "z"),
    ("ies", "y"),
    ("s", ""),
];

/// Endings on which the bare `-s` rule must not fire.
const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is", "ous"];

/// Two-stage lemmatizer: irregular-form root lookup, then suffix detachment
/// and, when configured, Snowball stemming.
pub struct Lemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    stemmer: Option<Stemmer>,
}

impl Lemmatizer {
    pub fn new(stemming: Option<Algorithm>) -> Self {
        Self {
            irregular: IRREGULAR_FORMS.iter().copied().collect(),
            stemmer: stemming.map(Stemmer::create),
        }
    }

    /// Root form from the irregular table, if any.
    pub fn root(&self, token: &str) -> Option<&'static str> {
        self.irregular.get(token).copied()
    }

    pub fn lemmatize(&self, token: &str) -> String {
        let base = self.root(token).unwrap_or(token);
        let singular = detach_noun_suffix(base);
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(&singular).into_owned(),
            None => singular,
        }
    }
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Lemmatizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lemmatizer")
            .field("irregular", &self.irregular.len())
            .field("stemming", &self.stemmer.is_some())
            .finish()
    }
}

fn detach_noun_suffix(word: &str) -> String {
    if word.chars().count() < 4 || !word.chars().all(char::is_alphabetic) {
        return word.to_string();
    }
    for (suffix, replacement) in NOUN_SUFFIXES {
        let Some(stem) = word.strip_suffix(suffix) else {
            continue;
        };
        if *suffix == "s" && PROTECTED_ENDINGS.iter().any(|e| word.ends_with(e)) {
            return word.to_string();
        }
        if stem.chars().count() < 2 {
            return word.to_string();
        }
        return format!("{stem}{replacement}");
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_plurals() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("printers"), "printer");
        assert_eq!(lem.lemmatize("batteries"), "battery");
        assert_eq!(lem.lemmatize("boxes"), "box");
        assert_eq!(lem.lemmatize("patches"), "patch");
        assert_eq!(lem.lemmatize("addresses"), "address");
    }

    #[test]
    fn protected_endings_untouched() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("access"), "access");
        assert_eq!(lem.lemmatize("status"), "status");
        assert_eq!(lem.lemmatize("analysis"), "analysis");
        assert_eq!(lem.lemmatize("bus"), "bus");
    }

    #[test]
    fn irregular_lookup_first() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.root("children"), Some("child"));
        assert_eq!(lem.lemmatize("children"), "child");
        assert_eq!(lem.lemmatize("went"), "go");
        assert_eq!(lem.lemmatize("services"), "service");
    }

    #[test]
    fn lemmas_are_stable() {
        let lem = Lemmatizer::default();
        for word in ["printer", "battery", "wifi", "login", "jam"] {
            assert_eq!(lem.lemmatize(word), word);
        }
    }

    #[test]
    fn non_alphabetic_tokens_kept() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("win10s"), "win10s");
    }

    #[test]
    fn stemming_applies_after_detachment() {
        let lem = Lemmatizer::new(Some(Algorithm::English));
        assert_eq!(lem.lemmatize("printing"), "print");
    }
}
