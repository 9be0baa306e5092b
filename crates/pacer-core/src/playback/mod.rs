//! Paced highlight playback.
//!
//! The controller is tick driven like a UI state machine: callers pass the
//! current time into every mutating call and [`PlaybackController::advance`]
//! answers how long to wait before the next tick. [`driver::drive`] turns that
//! into a cancellable async loop.

mod chunk;
pub mod driver;
#[cfg(test)]
mod tests;

use alloc::string::String;
use core::fmt;

use log::{debug, info, warn};

pub use chunk::chunk_end;

use crate::{
    document::Document,
    index::{WordIndex, WordRecord},
    settings::PlaybackConfig,
    timing::{TimingBudget, is_valid_pace},
    visual::VisualLayer,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Running,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaybackError {
    /// Pace was zero, negative or not finite.
    InvalidPace,
    /// The word id is not part of the loaded document.
    UnknownWord,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPace => f.write_str("pace must be a positive number of words per minute"),
            Self::UnknownWord => f.write_str("word id is not part of this document"),
        }
    }
}

/// Longest wait a single tick asks for. Near-zero paces would otherwise
/// request delays no timer can represent.
pub const MAX_DELAY_MS: u64 = 24 * 60 * 60 * 1_000;

/// Identifies the advancement loop allowed to mark words.
///
/// Every `start` issues a new token, so a loop left over from an earlier run
/// stops at its next tick instead of racing the new one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RunToken(u32);

/// Outcome of one advancement tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// A chunk was marked read; tick again after `delay_ms`.
    Wait { delay_ms: u64 },
    /// The document is exhausted and playback stopped.
    Finished,
    /// Playback was stopped, or the token belongs to an older run.
    Stopped,
}

/// Where elapsed time in the current sentence is measured from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SentenceAnchor {
    sentence_index: usize,
    index_in_sentence: usize,
    at_ms: u64,
}

impl SentenceAnchor {
    fn at(record: &WordRecord, now_ms: u64) -> Self {
        Self {
            sentence_index: record.sentence_index,
            index_in_sentence: record.index_in_sentence,
            at_ms: now_ms,
        }
    }
}

pub struct PlaybackController<V: VisualLayer> {
    title: Option<String>,
    index: WordIndex,
    budget: TimingBudget,
    config: PlaybackConfig,
    visual: V,
    state: PlaybackState,
    cursor: Option<usize>,
    anchor: Option<SentenceAnchor>,
    generation: u32,
}

impl<V: VisualLayer> PlaybackController<V> {
    pub fn new(document: Document, visual: V, config: PlaybackConfig) -> Self {
        let config = config.validated();
        let index = WordIndex::build(&document);
        let budget = TimingBudget::new(
            index.sentence_word_counts(),
            config.wpm,
            config.pause_ms as f64,
        )
        .unwrap_or_default();
        let cursor = if index.is_empty() { None } else { Some(0) };

        info!(
            "playback: loaded {} words in {} sentences",
            index.len(),
            index.sentence_count()
        );

        Self {
            title: document.title,
            index,
            budget,
            config,
            visual,
            state: PlaybackState::Stopped,
            cursor,
            anchor: None,
            generation: 0,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn index(&self) -> &WordIndex {
        &self.index
    }

    pub fn budget(&self) -> &TimingBudget {
        &self.budget
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn visual(&self) -> &V {
        &self.visual
    }

    pub fn visual_mut(&mut self) -> &mut V {
        &mut self.visual
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    /// Id of the next word to be marked read.
    pub fn cursor_id(&self) -> Option<&str> {
        self.cursor
            .and_then(|position| self.index.get(position))
            .map(|record| record.id.as_str())
    }

    pub fn cursor_position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn run_token(&self) -> Option<RunToken> {
        self.is_running().then_some(RunToken(self.generation))
    }

    pub fn set_pace(&mut self, wpm: f32) -> Result<(), PlaybackError> {
        if !is_valid_pace(wpm) {
            warn!("playback: rejected pace {}; keeping {}", wpm, self.config.wpm);
            return Err(PlaybackError::InvalidPace);
        }

        self.config.wpm = wpm;
        self.rebuild_budget();
        info!("playback: pace {} wpm", wpm);
        Ok(())
    }

    /// Step the pace by the configured increment. Returns whether it changed.
    pub fn adjust_pace(&mut self, increase: bool) -> bool {
        let next = self.config.stepped_wpm(increase);
        if next == self.config.wpm {
            return false;
        }

        self.set_pace(next).is_ok()
    }

    pub fn set_pause_ms(&mut self, pause_ms: u32) {
        self.config.pause_ms = pause_ms;
        self.rebuild_budget();
        info!("playback: sentence pause {} ms", pause_ms);
    }

    pub fn set_chunk_char_budget(&mut self, chars: usize) {
        self.config.chunk_char_budget = chars;
        self.rebuild_budget();
        info!("playback: chunk budget {} chars", chars);
    }

    /// Move the cursor to `word_id`.
    ///
    /// Every word after the target goes back to unread. The target and the
    /// words before it keep whatever mark they had, so a backward seek leaves
    /// the skipped-over words read.
    pub fn seek(&mut self, word_id: &str, now_ms: u64) -> Result<(), PlaybackError> {
        let Some(position) = self.index.position(word_id) else {
            warn!("playback: seek to unknown word {:?} ignored", word_id);
            return Err(PlaybackError::UnknownWord);
        };

        self.seek_position(position, now_ms);
        Ok(())
    }

    /// Handle a word activated in the visual layer: pause, jump there and
    /// highlight it as the next starting point.
    pub fn activate_word(&mut self, word_id: &str, now_ms: u64) -> Result<(), PlaybackError> {
        let Some(position) = self.index.position(word_id) else {
            warn!("playback: activation of unknown word {:?} ignored", word_id);
            return Err(PlaybackError::UnknownWord);
        };

        self.stop();
        self.seek_position(position, now_ms);
        self.visual.select(&self.index.records()[position]);
        Ok(())
    }

    /// Begin playback from the cursor. Returns whether a new run began.
    ///
    /// A document that was read through stays finished until a `seek` gives
    /// the cursor a word again.
    pub fn start(&mut self, now_ms: u64) -> bool {
        let Some(cursor) = self.cursor else {
            debug!("playback: start ignored, nothing left to read");
            return false;
        };
        if self.is_running() {
            debug!("playback: start ignored, already running");
            return false;
        }

        self.seek_position(cursor, now_ms);
        self.visual.clear_selection();
        self.state = PlaybackState::Running;
        self.generation = self.generation.wrapping_add(1);
        info!("playback: running from {:?}", self.cursor_id());
        true
    }

    /// Returns whether playback was running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.state = PlaybackState::Stopped;
        info!("playback: stopped at {:?}", self.cursor_id());
        true
    }

    /// Mark the next chunk read and report how long to wait before the next
    /// tick.
    pub fn advance(&mut self, token: RunToken, now_ms: u64) -> Step {
        if !self.is_running() || token.0 != self.generation {
            return Step::Stopped;
        }

        let Some(start) = self.cursor else {
            self.state = PlaybackState::Stopped;
            info!("playback: finished");
            return Step::Finished;
        };

        let records = self.index.records();
        let first = &records[start];
        let anchor = match self.anchor {
            Some(anchor) if anchor.sentence_index == first.sentence_index => anchor,
            _ => {
                let anchor = SentenceAnchor::at(first, now_ms);
                self.anchor = Some(anchor);
                anchor
            }
        };

        let end = chunk_end(records, start, self.config.chunk_char_budget);
        self.visual.mark_read(&records[start..=end]);

        let last = &records[end];
        let words_since_anchor =
            (last.index_in_sentence + 1).saturating_sub(anchor.index_in_sentence);
        let mut expected_ms =
            self.budget.per_word_ms(first.sentence_index) * words_since_anchor as f64;
        if last.is_sentence_end {
            expected_ms += self.config.pause_ms as f64;
        }
        let elapsed_ms = now_ms.saturating_sub(anchor.at_ms) as f64;
        let delay_ms = to_delay_ms(expected_ms - elapsed_ms);

        self.cursor = last.next;
        debug!(
            "playback: marked {}..={} (sentence {}), next tick in {} ms",
            start, end, first.sentence_index, delay_ms
        );

        Step::Wait { delay_ms }
    }

    /// Approximate time left, ignoring pauses.
    pub fn time_remaining_ms(&self) -> f64 {
        if self.index.is_empty() {
            return 0.0;
        }

        match self.cursor.and_then(|position| self.index.get(position)) {
            Some(record) => self
                .budget
                .remaining_ms(record.sentence_index, record.index_in_sentence),
            None => self.budget.total_ms(),
        }
    }

    fn seek_position(&mut self, position: usize, now_ms: u64) {
        let records = self.index.records();
        self.cursor = Some(position);
        self.anchor = Some(SentenceAnchor::at(&records[position], now_ms));
        self.visual.reset_unread(&records[position + 1..]);
        debug!("playback: cursor at {}", position);
    }

    fn rebuild_budget(&mut self) {
        match TimingBudget::new(
            self.index.sentence_word_counts(),
            self.config.wpm,
            self.config.pause_ms as f64,
        ) {
            Ok(budget) => self.budget = budget,
            Err(err) => warn!("playback: budget not rebuilt: {}", err),
        }
    }
}

fn to_delay_ms(ms: f64) -> u64 {
    if ms <= 0.0 {
        0
    } else {
        ((ms + 0.5) as u64).min(MAX_DELAY_MS)
    }
}
