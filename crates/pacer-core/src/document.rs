//! Segmented document model consumed by the engine.

use alloc::{string::String, vec::Vec};

/// One identified word as produced by a segmenter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    pub id: String,
    pub text: String,
}

impl Word {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Words of one sentence, in reading order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Sentence {
    pub words: Vec<Word>,
}

impl Sentence {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// A whole reading session's text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Document {
    pub title: Option<String>,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(title: Option<String>, sentences: Vec<Sentence>) -> Self {
        Self { title, sentences }
    }

    pub fn word_count(&self) -> usize {
        self.sentences.iter().map(|sentence| sentence.words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }
}
