use crate::index::WordRecord;

/// Position of the last word in the chunk that begins at `start`.
///
/// Words are taken while their running total of `char_len + 1` fits in
/// `char_budget` and they stay in `start`'s sentence. The first word is
/// always part of the chunk, even when it alone exceeds the budget.
pub fn chunk_end(records: &[WordRecord], start: usize, char_budget: usize) -> usize {
    let Some(first) = records.get(start) else {
        return start;
    };

    let mut end = start;
    let mut total = first.char_len + 1;
    while let Some(next) = records[end].next {
        let Some(word) = records.get(next) else {
            break;
        };
        if word.sentence_index != first.sentence_index {
            break;
        }

        let len = word.char_len + 1;
        if total + len > char_budget {
            break;
        }
        total += len;
        end = next;
    }

    end
}
