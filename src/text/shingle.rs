// Shingled tokenization — filtered n-gram terms over a base tokenizer.
//
// Every token from the base tokenizer is filtered (too short, numeric, or a
// stopword becomes an empty slot) and pushed into a window of the last K
// slots. After each push, shingles of length 1..K ending at the newest token
// are emitted, stopping at the first empty slot. Empty slots therefore act
// as phrase breaks: no shingle ever spans a filtered word.

use std::collections::VecDeque;

use anyhow::Result;

use super::analyzer::BaseTokenizer;
use super::stopwords::StopwordSet;

/// Tokens shorter than this many characters are filtered out.
pub const MIN_WORD_CHARS: usize = 3;

/// Fixed-capacity window of recent filtered tokens, newest first.
#[derive(Debug, Clone)]
pub struct ShingleWindow {
    slots: VecDeque<Option<String>>,
    capacity: usize,
}

impl ShingleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a slot; the oldest one falls off once the window is full.
    pub fn push(&mut self, word: Option<String>) {
        if self.slots.len() == self.capacity {
            self.slots.pop_back();
        }
        self.slots.push_front(word);
    }

    /// Append every shingle ending at the newest slot to `out`.
    pub fn emit_into(&self, out: &mut Vec<String>) {
        let mut shingle = String::new();
        for slot in &self.slots {
            let Some(word) = slot else {
                break;
            };
            if shingle.is_empty() {
                shingle.push_str(word);
            } else {
                // Older words go in front to keep reading order.
                shingle.insert(0, ' ');
                shingle.insert_str(0, word);
            }
            out.push(shingle.clone());
        }
    }
}

/// Produces the term sequence for a piece of text.
pub struct ShingledTokenizer<T> {
    base: T,
    shingle_size: usize,
    stopwords: StopwordSet,
}

impl<T: BaseTokenizer> ShingledTokenizer<T> {
    pub fn new(base: T, shingle_size: usize, stopwords: StopwordSet) -> Result<Self> {
        if shingle_size == 0 {
            anyhow::bail!("Shingle size must be at least 1");
        }
        Ok(Self {
            base,
            shingle_size,
            stopwords,
        })
    }

    pub fn shingle_size(&self) -> usize {
        self.shingle_size
    }

    /// Ordered, non-deduplicated terms for `text`.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let tokens = self.base.tokenize(text);
        let mut window = ShingleWindow::new(self.shingle_size);
        let mut terms = Vec::with_capacity(tokens.len() * self.shingle_size);

        for token in tokens {
            window.push(self.filter_word(token));
            window.emit_into(&mut terms);
        }
        terms
    }

    fn filter_word(&self, word: String) -> Option<String> {
        if word.chars().count() < MIN_WORD_CHARS {
            return None;
        }
        if is_numeric(&word) {
            return None;
        }
        if self.stopwords.contains(&word) {
            return None;
        }
        Some(word)
    }
}

/// Digits with optional thousands / decimal separators.
fn is_numeric(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}
