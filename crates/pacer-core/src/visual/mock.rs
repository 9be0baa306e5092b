use alloc::{collections::BTreeMap, string::String, vec::Vec};

use super::VisualLayer;
use crate::index::WordRecord;

/// Visual state of one word as seen by [`RecordingVisual`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WordMark {
    #[default]
    Unread,
    Read,
}

/// Headless visual layer that remembers every change.
#[derive(Clone, Debug, Default)]
pub struct RecordingVisual {
    marks: BTreeMap<String, WordMark>,
    read_log: Vec<String>,
    batches: Vec<usize>,
    selected: Option<String>,
}

impl RecordingVisual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, id: &str) -> WordMark {
        self.marks.get(id).copied().unwrap_or_default()
    }

    /// Ids in the order they were marked read, repeats included.
    pub fn read_log(&self) -> &[String] {
        &self.read_log
    }

    /// Size of each `mark_read` batch.
    pub fn batches(&self) -> &[usize] {
        &self.batches
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

impl VisualLayer for RecordingVisual {
    fn mark_read(&mut self, words: &[WordRecord]) {
        for word in words {
            self.marks.insert(word.id.clone(), WordMark::Read);
            self.read_log.push(word.id.clone());
        }
        self.batches.push(words.len());
    }

    fn reset_unread(&mut self, words: &[WordRecord]) {
        for word in words {
            self.marks.insert(word.id.clone(), WordMark::Unread);
        }
    }

    fn select(&mut self, word: &WordRecord) {
        self.selected = Some(word.id.clone());
    }

    fn clear_selection(&mut self) {
        self.selected = None;
    }
}
