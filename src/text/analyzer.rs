// Base tokenizer trait — swap-ready abstraction over the analysis chain.
//
// The shingler only needs a sequence of normalized tokens. The default
// implementation is a statically declared tantivy pipeline: split on
// non-alphanumerics, drop absurdly long tokens, lower-case, English stem.

use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer, TokenStream,
};

/// Tokens longer than this many bytes are dropped before stemming.
pub const MAX_TOKEN_BYTES: usize = 40;

/// Trait for turning text into normalized (lower-cased, stemmed) tokens.
pub trait BaseTokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// English analysis chain built on tantivy's tokenizer filters.
#[derive(Clone)]
pub struct EnglishAnalyzer {
    analyzer: TextAnalyzer,
}

impl EnglishAnalyzer {
    pub fn new() -> Self {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
            .filter(LowerCaser)
            .filter(Stemmer::new(Language::English))
            .build();
        Self { analyzer }
    }
}

impl Default for EnglishAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseTokenizer for EnglishAnalyzer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        // Token streams borrow the analyzer mutably, so each call works on
        // its own copy of the chain.
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);

        let mut tokens = Vec::with_capacity(text.len() / 6);
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        tokens
    }
}

/// Whitespace tokenizer with lower-casing only. No stemming.
///
/// Useful where exact word forms matter, and as a predictable tokenizer in
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl BaseTokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits_punctuation() {
        let tokens = EnglishAnalyzer::new().tokenize("Hello there world!");
        assert_eq!(tokens, vec!["hello", "there", "world"]);
    }

    #[test]
    fn test_stems() {
        let tokens = EnglishAnalyzer::new().tokenize("running parsers");
        assert_eq!(tokens, vec!["run", "parser"]);
    }

    #[test]
    fn test_whitespace_tokenizer() {
        assert_eq!(WhitespaceTokenizer.tokenize(" A  b\tC "), vec!["a", "b", "c"]);
    }
}
