//! Runtime playback configuration.

use log::warn;

use crate::timing::is_valid_pace;

pub const DEFAULT_WPM: f32 = 450.0;
pub const DEFAULT_PAUSE_MS: u32 = 200;
pub const DEFAULT_CHUNK_CHAR_BUDGET: usize = 9;

/// User-tunable pacing knobs. All of them can change while reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackConfig {
    pub wpm: f32,
    pub pause_ms: u32,
    pub chunk_char_budget: usize,
    /// Bounds for stepped pace adjustment. `wpm` itself may sit outside them.
    pub min_wpm: f32,
    pub max_wpm: f32,
    pub wpm_step: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            pause_ms: DEFAULT_PAUSE_MS,
            chunk_char_budget: DEFAULT_CHUNK_CHAR_BUDGET,
            min_wpm: 60.0,
            max_wpm: 1_500.0,
            wpm_step: 10.0,
        }
    }
}

impl PlaybackConfig {
    pub const fn with_wpm(mut self, wpm: f32) -> Self {
        self.wpm = wpm;
        self
    }

    pub const fn with_pause_ms(mut self, pause_ms: u32) -> Self {
        self.pause_ms = pause_ms;
        self
    }

    pub const fn with_chunk_char_budget(mut self, chunk_char_budget: usize) -> Self {
        self.chunk_char_budget = chunk_char_budget;
        self
    }

    /// Repair values the engine cannot run with.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if !is_valid_pace(self.wpm) {
            warn!("settings: invalid wpm {}; using {}", self.wpm, defaults.wpm);
            self.wpm = defaults.wpm;
        }
        if !is_valid_pace(self.min_wpm) || !is_valid_pace(self.max_wpm) {
            self.min_wpm = defaults.min_wpm;
            self.max_wpm = defaults.max_wpm;
        }
        if self.max_wpm < self.min_wpm {
            core::mem::swap(&mut self.max_wpm, &mut self.min_wpm);
        }
        if !is_valid_pace(self.wpm_step) {
            self.wpm_step = defaults.wpm_step;
        }

        self
    }

    /// Pace one step faster or slower, kept inside `min_wpm..=max_wpm`.
    pub fn stepped_wpm(&self, increase: bool) -> f32 {
        let next = if increase {
            self.wpm + self.wpm_step
        } else {
            self.wpm - self.wpm_step
        };
        next.clamp(self.min_wpm, self.max_wpm)
    }
}
