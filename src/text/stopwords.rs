// Stopword sets.
//
// Stopwords are compared against tokens *after* the base tokenizer has
// normalized them, so any list that isn't already in normalized form (like
// the stop-words crate's English list) is pushed through the tokenizer first.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use stop_words::{get, LANGUAGE};

use super::analyzer::BaseTokenizer;

#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a stopword file: one term per line.
    ///
    /// Only the text before the first tab is used, so a document-frequency
    /// report (`term<TAB>df`) can be fed back in directly. Blank lines are
    /// ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read stopwords file {}", path.display()))?;

        let words = text
            .lines()
            .map(|line| line.split('\t').next().unwrap_or_default().trim())
            .filter(|word| !word.is_empty())
            .map(str::to_string);

        Ok(Self::from_words(words))
    }

    /// The stop-words crate's English list, normalized through `tokenizer`.
    pub fn english<T: BaseTokenizer>(tokenizer: &T) -> Self {
        let raw: Vec<String> = get(LANGUAGE::English);
        Self::from_words(raw.iter().flat_map(|w| tokenizer.tokenize(w)))
    }

    pub fn extend(&mut self, other: StopwordSet) {
        self.words.extend(other.words);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::analyzer::WhitespaceTokenizer;

    #[test]
    fn test_from_file_takes_first_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "thanks\t0.91\n\n  regards  \n").unwrap();

        let set = StopwordSet::from_file(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("thanks"));
        assert!(set.contains("regards"));
    }

    #[test]
    fn test_english_list_is_not_empty() {
        let set = StopwordSet::english(&WhitespaceTokenizer);
        assert!(set.contains("the"));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(StopwordSet::from_file(Path::new("/no/such/stopwords")).is_err());
    }
}
