//! Flat per-word lookup built once per document.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use log::warn;

use crate::document::Document;

/// Precomputed placement of one word in reading order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WordRecord {
    pub id: String,
    pub text: String,
    /// Length of `text` in chars, used for chunk budgeting.
    pub char_len: usize,
    pub sentence_index: usize,
    pub index_in_sentence: usize,
    /// Position of the following word in global reading order.
    pub next: Option<usize>,
    pub is_sentence_end: bool,
}

#[derive(Clone, Debug, Default)]
pub struct WordIndex {
    records: Vec<WordRecord>,
    positions: BTreeMap<String, usize>,
    sentence_word_counts: Vec<usize>,
}

impl WordIndex {
    /// Index `document` in a single pass.
    ///
    /// Sentences without words are skipped, so `sentence_index` counts only
    /// sentences that hold at least one word.
    pub fn build(document: &Document) -> Self {
        let mut index = Self::default();

        for sentence in document.sentences.iter().filter(|s| !s.is_empty()) {
            let sentence_index = index.sentence_word_counts.len();
            let last = sentence.words.len() - 1;

            for (index_in_sentence, word) in sentence.words.iter().enumerate() {
                let position = index.records.len();
                if let Some(previous) = index.records.last_mut() {
                    previous.next = Some(position);
                }

                if index.positions.contains_key(&word.id) {
                    warn!("index: duplicate word id {:?}; keeping first", word.id);
                } else {
                    index.positions.insert(word.id.clone(), position);
                }

                index.records.push(WordRecord {
                    id: word.id.clone(),
                    text: word.text.clone(),
                    char_len: word.text.chars().count(),
                    sentence_index,
                    index_in_sentence,
                    next: None,
                    is_sentence_end: index_in_sentence == last,
                });
            }

            index.sentence_word_counts.push(sentence.words.len());
        }

        index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_word_counts.len()
    }

    pub fn sentence_word_counts(&self) -> &[usize] {
        &self.sentence_word_counts
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn get(&self, position: usize) -> Option<&WordRecord> {
        self.records.get(position)
    }

    pub fn record(&self, id: &str) -> Option<&WordRecord> {
        self.position(id).and_then(|position| self.get(position))
    }

    pub fn next_word_id(&self, id: &str) -> Option<&str> {
        let next = self.record(id)?.next?;
        self.get(next).map(|record| record.id.as_str())
    }
}
