//! Visual layer abstraction.

pub mod mock;

use crate::index::WordRecord;

/// Receiver of word highlight changes.
///
/// Every call is synchronous and in-memory; the controller never suspends
/// while a batch is being applied.
pub trait VisualLayer {
    /// Mark a chunk as read. The slice is contiguous in reading order.
    fn mark_read(&mut self, words: &[WordRecord]);

    /// Return words to the unread state.
    fn reset_unread(&mut self, words: &[WordRecord]);

    /// Highlight a word the reader picked as the next starting point.
    fn select(&mut self, _word: &WordRecord) {}

    /// Drop any selection highlight.
    fn clear_selection(&mut self) {}
}

impl<V: VisualLayer + ?Sized> VisualLayer for &mut V {
    fn mark_read(&mut self, words: &[WordRecord]) {
        (**self).mark_read(words);
    }

    fn reset_unread(&mut self, words: &[WordRecord]) {
        (**self).reset_unread(words);
    }

    fn select(&mut self, word: &WordRecord) {
        (**self).select(word);
    }

    fn clear_selection(&mut self) {
        (**self).clear_selection();
    }
}
