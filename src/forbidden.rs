use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::algo::tokenizer::strip_punctuation;
use crate::error::{Error, Result};

/// Caller-supplied words excluded from analysis, normalized once at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenWordSet {
    words: HashSet<String>,
}

impl ForbiddenWordSet {
    /// Load a newline-delimited UTF-8 word list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_lines(content.lines());
        info!(path = %path.display(), words = set.len(), "loaded forbidden words");
        Ok(set)
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = lines
            .into_iter()
            .map(|line| normalize_word(line.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// Byte order mark some editors put in front of the first line.
const BOM: char = '\u{feff}';

/// Lowercase, drop ASCII punctuation and byte order marks, trim.
fn normalize_word(raw: &str) -> String {
    strip_punctuation(&raw.to_lowercase())
        .trim_matches(|c: char| c.is_whitespace() || c == BOM)
        .to_string()
}
