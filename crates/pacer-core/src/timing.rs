//! Sentence timing budget.
//!
//! The whole document is read in `total_words / wpm` minutes *including* the
//! fixed pause after every sentence, so the time left for the words
//! themselves is that duration minus all pauses. That remainder is split
//! between sentences purely by word count.

use alloc::vec::Vec;
use core::fmt;

use log::warn;

const MS_PER_MINUTE: f64 = 60_000.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimingError {
    /// Pace was zero, negative or not finite.
    InvalidPace,
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPace => f.write_str("pace must be a positive number of words per minute"),
        }
    }
}

pub(crate) fn is_valid_pace(wpm: f32) -> bool {
    wpm.is_finite() && wpm > 0.0
}

/// Per-sentence reading durations in milliseconds.
///
/// When pauses outweigh the reading time the result goes non-positive. That
/// case is reported in the log but the arithmetic is left as is.
pub fn compute_budget(
    sentence_word_counts: &[usize],
    wpm: f32,
    pause_ms: f64,
) -> Result<Vec<f64>, TimingError> {
    if !is_valid_pace(wpm) {
        return Err(TimingError::InvalidPace);
    }

    let total_words: usize = sentence_word_counts.iter().sum();
    if total_words == 0 {
        return Ok(Vec::new());
    }

    let total_words = total_words as f64;
    let total_time = total_words / wpm as f64 * MS_PER_MINUTE
        - pause_ms * sentence_word_counts.len() as f64;
    if total_time <= 0.0 {
        warn!(
            "timing: pauses exceed reading time (wpm={} pause_ms={} total_time={})",
            wpm, pause_ms, total_time
        );
    }

    Ok(sentence_word_counts
        .iter()
        .map(|&count| total_time * (count as f64 / total_words))
        .collect())
}

/// Cached budget plus the word counts it was derived from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimingBudget {
    durations: Vec<f64>,
    word_counts: Vec<usize>,
}

impl TimingBudget {
    pub fn new(sentence_word_counts: &[usize], wpm: f32, pause_ms: f64) -> Result<Self, TimingError> {
        Ok(Self {
            durations: compute_budget(sentence_word_counts, wpm, pause_ms)?,
            word_counts: sentence_word_counts.to_vec(),
        })
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn sentence_ms(&self, sentence: usize) -> f64 {
        self.durations.get(sentence).copied().unwrap_or(0.0)
    }

    /// Uniform duration of one word inside `sentence`.
    pub fn per_word_ms(&self, sentence: usize) -> f64 {
        match self.word_counts.get(sentence) {
            Some(&count) if count > 0 => self.sentence_ms(sentence) / count as f64,
            _ => 0.0,
        }
    }

    pub fn total_ms(&self) -> f64 {
        self.durations.iter().sum()
    }

    /// Estimated time left when word `word` of `sentence` is next.
    ///
    /// Pauses are not part of the estimate.
    pub fn remaining_ms(&self, sentence: usize, word: usize) -> f64 {
        let Some(&count) = self.word_counts.get(sentence) else {
            return 0.0;
        };
        let consumed = if count == 0 { 0.0 } else { word as f64 / count as f64 };
        let rest: f64 = self.durations[sentence + 1..].iter().sum();

        self.sentence_ms(sentence) * (1.0 - consumed) + rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn budget_plus_pauses_matches_pace() {
        let cases: [(&[usize], f32, f64); 4] = [
            (&[12, 7, 30, 1], 450.0, 200.0),
            (&[1], 60.0, 0.0),
            (&[5, 5, 5, 5, 5, 5], 233.5, 75.0),
            (&[40, 2, 19], 1200.0, 10.0),
        ];

        for (counts, wpm, pause) in cases {
            let budget = compute_budget(counts, wpm, pause).unwrap();
            let words: usize = counts.iter().sum();
            let total: f64 = budget.iter().sum::<f64>() + pause * counts.len() as f64;
            assert!(close(total, words as f64 / wpm as f64 * 60_000.0), "{counts:?}");
        }
    }

    #[test]
    fn time_is_split_by_word_count() {
        let budget = compute_budget(&[10, 20, 10], 300.0, 100.0).unwrap();
        let total_time = 40.0 / 300.0 * 60_000.0 - 300.0;

        assert!(close(budget[0], total_time * 0.25));
        assert!(close(budget[1], total_time * 0.5));
        assert!(close(budget[1], budget[0] * 2.0));
        assert!(close(budget[0], budget[2]));
    }

    #[test]
    fn rejects_non_positive_pace() {
        assert_eq!(compute_budget(&[3], 0.0, 200.0), Err(TimingError::InvalidPace));
        assert_eq!(compute_budget(&[3], -10.0, 200.0), Err(TimingError::InvalidPace));
        assert_eq!(compute_budget(&[3], f32::NAN, 200.0), Err(TimingError::InvalidPace));
    }

    #[test]
    fn empty_document_has_empty_budget() {
        assert_eq!(compute_budget(&[], 450.0, 200.0), Ok(Vec::new()));
    }

    #[test]
    fn dominant_pauses_are_not_clamped() {
        // 2 words at 600 wpm is 200 ms of reading; two 500 ms pauses leave -800 ms.
        let budget = compute_budget(&[1, 1], 600.0, 500.0).unwrap();
        assert!(close(budget[0], -400.0));
        assert!(close(budget[1], -400.0));
    }

    #[test]
    fn per_word_time_is_uniform_within_a_sentence() {
        let budget = TimingBudget::new(&[4, 2], 120.0, 0.0).unwrap();
        assert!(close(budget.per_word_ms(0), 500.0));
        assert!(close(budget.per_word_ms(1), 500.0));
        assert_eq!(budget.per_word_ms(9), 0.0);
    }

    #[test]
    fn remaining_counts_partial_sentence_and_the_rest() {
        let budget = TimingBudget::new(&[4, 2, 2], 60.0, 0.0).unwrap();

        assert!(close(budget.remaining_ms(0, 0), budget.total_ms()));
        assert!(close(budget.remaining_ms(0, 2), 2_000.0 + 4_000.0));
        assert!(close(budget.remaining_ms(2, 1), 1_000.0));
    }
}
