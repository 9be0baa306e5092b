//! Tap/hold disambiguation for the single play control.
//!
//! Pressing always pauses, so holding the control previews a pause. What the
//! release does depends on how long the press lasted and whether playback was
//! running when it began:
//!
//! | was running | held            | result        |
//! |-------------|-----------------|---------------|
//! | yes         | <= threshold    | stay paused   |
//! | yes         | > threshold     | resume        |
//! | no          | any             | resume        |

use log::debug;

use crate::{playback::PlaybackController, visual::VisualLayer};

pub const HOLD_THRESHOLD_MS: u64 = 200;

/// How a completed press was interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gesture {
    /// Quick press while playing: playback stays paused.
    Tap,
    /// Long press while playing: paused while held, resumed on release.
    Hold,
    /// Any press while already paused: playback resumes.
    Resume,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Press {
    at_ms: u64,
    was_playing: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GestureDisambiguator {
    hold_threshold_ms: u64,
    press: Option<Press>,
}

impl Default for GestureDisambiguator {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDisambiguator {
    pub const fn new() -> Self {
        Self {
            hold_threshold_ms: HOLD_THRESHOLD_MS,
            press: None,
        }
    }

    pub const fn with_hold_threshold_ms(mut self, hold_threshold_ms: u64) -> Self {
        self.hold_threshold_ms = hold_threshold_ms;
        self
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Control went down. Key repeat while held is ignored.
    pub fn press<V: VisualLayer>(&mut self, now_ms: u64, controller: &mut PlaybackController<V>) {
        if self.press.is_some() {
            return;
        }

        self.press = Some(Press {
            at_ms: now_ms,
            was_playing: controller.is_running(),
        });
        controller.stop();
    }

    /// Control went up. Returns `None` for a release without a press.
    pub fn release<V: VisualLayer>(
        &mut self,
        now_ms: u64,
        controller: &mut PlaybackController<V>,
    ) -> Option<Gesture> {
        let press = self.press.take()?;
        let held_ms = now_ms.saturating_sub(press.at_ms);

        let gesture = match (press.was_playing, held_ms <= self.hold_threshold_ms) {
            (true, true) => Gesture::Tap,
            (true, false) => Gesture::Hold,
            (false, _) => Gesture::Resume,
        };
        if gesture != Gesture::Tap {
            controller.start(now_ms);
        }

        debug!("gesture: {:?} after {} ms", gesture, held_ms);
        Some(gesture)
    }
}
