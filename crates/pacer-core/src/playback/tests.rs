use core::cell::RefCell;

use super::driver::{DriveOutcome, Pacer, drive};
use super::*;
use crate::{
    document::{Document, Sentence, Word},
    visual::mock::{RecordingVisual, WordMark},
};

/// Builds sentences of placeholder words with the given char lengths.
/// Ids are `w0`, `w1`, ... in reading order.
fn doc_from_lengths(sentences: &[&[usize]]) -> Document {
    let mut n = 0usize;
    let sentences = sentences
        .iter()
        .map(|lengths| {
            Sentence::new(
                lengths
                    .iter()
                    .map(|&len| {
                        let word = Word::new(format!("w{n}"), "x".repeat(len));
                        n += 1;
                        word
                    })
                    .collect(),
            )
        })
        .collect();
    Document::new(Some("Test".into()), sentences)
}

fn make_controller(
    sentences: &[&[usize]],
    config: PlaybackConfig,
) -> PlaybackController<RecordingVisual> {
    PlaybackController::new(doc_from_lengths(sentences), RecordingVisual::new(), config)
}

/// One word per tick: every word is at least 2 chars with its separator.
fn single_word_config(wpm: f32, pause_ms: u32) -> PlaybackConfig {
    PlaybackConfig::default()
        .with_wpm(wpm)
        .with_pause_ms(pause_ms)
        .with_chunk_char_budget(1)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn ids(range: core::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|i| format!("w{i}")).collect()
}

struct SimulatedPacer<'a> {
    now_ms: u64,
    waits: usize,
    stop_after_waits: Option<(usize, &'a RefCell<PlaybackController<RecordingVisual>>)>,
}

impl<'a> SimulatedPacer<'a> {
    fn new() -> Self {
        Self {
            now_ms: 0,
            waits: 0,
            stop_after_waits: None,
        }
    }

    fn stopping(
        after: usize,
        controller: &'a RefCell<PlaybackController<RecordingVisual>>,
    ) -> Self {
        Self {
            stop_after_waits: Some((after, controller)),
            ..Self::new()
        }
    }
}

impl Pacer for SimulatedPacer<'_> {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    async fn wait_ms(&mut self, delay_ms: u64) {
        self.now_ms += delay_ms;
        self.waits += 1;
        if let Some((after, controller)) = self.stop_after_waits
            && self.waits == after
        {
            controller.borrow_mut().stop();
        }
    }
}

#[test]
fn starts_stopped_at_first_word() {
    let controller = make_controller(&[&[3, 3]], PlaybackConfig::default());

    assert_eq!(controller.state(), PlaybackState::Stopped);
    assert_eq!(controller.cursor_id(), Some("w0"));
    assert_eq!(controller.title(), Some("Test"));
    assert_eq!(controller.run_token(), None);
}

#[test]
fn chunk_takes_words_while_budget_fits() {
    let controller = make_controller(&[&[3, 4, 2, 5]], PlaybackConfig::default());
    let records = controller.index().records();

    // 3+1 + 4+1 = 9 fits; adding 2+1 would reach 12.
    assert_eq!(chunk_end(records, 0, 9), 1);
    // 2+1 + 5+1 = 9 fits exactly.
    assert_eq!(chunk_end(records, 2, 9), 3);
}

#[test]
fn chunk_never_crosses_sentences() {
    let controller = make_controller(&[&[1, 1], &[1, 1]], PlaybackConfig::default());
    let records = controller.index().records();

    assert_eq!(chunk_end(records, 0, 100), 1);
    assert_eq!(chunk_end(records, 1, 100), 1);
    assert_eq!(chunk_end(records, 2, 100), 3);
}

#[test]
fn oversized_word_forms_its_own_chunk() {
    let controller = make_controller(&[&[20, 1, 1]], PlaybackConfig::default());
    let records = controller.index().records();

    assert_eq!(chunk_end(records, 0, 9), 0);
    assert_eq!(chunk_end(records, 1, 9), 2);
}

#[test]
fn advance_marks_chunks_in_one_batch() {
    let mut controller = make_controller(&[&[3, 4, 2, 5]], PlaybackConfig::default());
    assert!(controller.start(0));
    let token = controller.run_token().unwrap();

    assert!(matches!(controller.advance(token, 0), Step::Wait { .. }));
    assert_eq!(controller.visual().batches(), &[2]);
    assert_eq!(controller.cursor_id(), Some("w2"));

    assert!(matches!(controller.advance(token, 0), Step::Wait { .. }));
    assert_eq!(controller.visual().batches(), &[2, 2]);
    assert_eq!(controller.cursor_id(), None);
}

#[test]
fn waits_compensate_for_drift() {
    // 4 words at 60 wpm with no pause: 1 s per word.
    let mut controller = make_controller(&[&[1, 1, 1, 1]], single_word_config(60.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();

    assert_eq!(controller.advance(token, 0), Step::Wait { delay_ms: 1_000 });
    assert_eq!(controller.advance(token, 1_000), Step::Wait { delay_ms: 1_000 });
    // Woke 300 ms late: the next wait shrinks to stay on schedule.
    assert_eq!(controller.advance(token, 2_300), Step::Wait { delay_ms: 700 });
    // Far behind: no wait at all.
    assert_eq!(controller.advance(token, 9_000), Step::Wait { delay_ms: 0 });
}

#[test]
fn sentence_end_adds_pause_and_reanchors() {
    // 4 words at 60 wpm = 4000 ms, minus two 500 ms pauses = 750 ms per word.
    let mut controller = make_controller(&[&[1, 1], &[1, 1]], single_word_config(60.0, 500));
    controller.start(0);
    let token = controller.run_token().unwrap();

    assert_eq!(controller.advance(token, 0), Step::Wait { delay_ms: 750 });
    assert_eq!(controller.advance(token, 750), Step::Wait { delay_ms: 1_250 });
    // New sentence measures from its own first word.
    assert_eq!(controller.advance(token, 2_000), Step::Wait { delay_ms: 750 });
    assert_eq!(controller.advance(token, 2_750), Step::Wait { delay_ms: 1_250 });
    assert_eq!(controller.advance(token, 4_000), Step::Finished);
    assert!(!controller.is_running());
}

#[test]
fn pace_change_keeps_sentence_anchor() {
    let mut controller = make_controller(&[&[1, 1, 1, 1]], single_word_config(60.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();

    controller.advance(token, 0);
    controller.advance(token, 1_000);
    controller.set_pace(120.0).unwrap();
    // Third word is due 3 * 500 ms after the anchor, already past at 2000 ms.
    assert_eq!(controller.advance(token, 2_000), Step::Wait { delay_ms: 0 });
    assert_eq!(controller.advance(token, 2_000), Step::Wait { delay_ms: 0 });
}

#[test]
fn seek_resets_only_words_after_target() {
    let sentence: &[usize] = &[1; 10];
    let mut controller = make_controller(&[sentence], single_word_config(450.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();
    for _ in 0..6 {
        controller.advance(token, 0);
    }
    controller.stop();
    assert_eq!(controller.cursor_id(), Some("w6"));

    controller.seek("w2", 10).unwrap();
    assert_eq!(controller.cursor_id(), Some("w2"));
    for id in ids(0..=2) {
        assert_eq!(controller.visual().mark(&id), WordMark::Read, "{id}");
    }
    for id in ids(3..=9) {
        assert_eq!(controller.visual().mark(&id), WordMark::Unread, "{id}");
    }

    // Forward seek leaves the skipped words as they were.
    controller.seek("w7", 20).unwrap();
    for id in ids(0..=2) {
        assert_eq!(controller.visual().mark(&id), WordMark::Read, "{id}");
    }
    for id in ids(3..=9) {
        assert_eq!(controller.visual().mark(&id), WordMark::Unread, "{id}");
    }
    assert_eq!(controller.cursor_id(), Some("w7"));
}

#[test]
fn backward_seek_keeps_target_marked_read() {
    let mut controller = make_controller(&[&[1, 1, 1]], single_word_config(450.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();
    controller.advance(token, 0);
    controller.advance(token, 0);

    controller.seek("w0", 0).unwrap();
    assert_eq!(controller.visual().mark("w0"), WordMark::Read);
    assert_eq!(controller.visual().mark("w1"), WordMark::Unread);
}

#[test]
fn seek_to_unknown_word_changes_nothing() {
    let mut controller = make_controller(&[&[1, 1, 1]], single_word_config(450.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();
    controller.advance(token, 0);

    assert_eq!(controller.seek("nope", 5), Err(PlaybackError::UnknownWord));
    assert_eq!(controller.cursor_id(), Some("w1"));
    assert_eq!(controller.visual().mark("w0"), WordMark::Read);
    assert!(controller.is_running());
}

#[test]
fn seek_while_running_continues_from_target() {
    let mut controller = make_controller(&[&[1, 1, 1, 1]], single_word_config(60.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();
    controller.advance(token, 0);

    controller.seek("w3", 500).unwrap();
    assert_eq!(controller.advance(token, 500), Step::Wait { delay_ms: 1_000 });
    assert_eq!(controller.visual().read_log(), &["w0".to_string(), "w3".to_string()]);
}

#[test]
fn start_is_idempotent_while_running() {
    let mut controller = make_controller(&[&[1, 1]], PlaybackConfig::default());

    assert!(controller.start(0));
    let token = controller.run_token();
    assert!(!controller.start(5));
    assert_eq!(controller.run_token(), token);
}

#[test]
fn restart_invalidates_old_loop() {
    let mut controller = make_controller(&[&[1, 1, 1]], single_word_config(450.0, 0));
    controller.start(0);
    let old = controller.run_token().unwrap();
    controller.stop();
    controller.start(10);
    let new = controller.run_token().unwrap();

    assert_ne!(old, new);
    assert_eq!(controller.advance(old, 10), Step::Stopped);
    assert!(controller.visual().read_log().is_empty());
    assert!(matches!(controller.advance(new, 10), Step::Wait { .. }));
}

#[test]
fn stopped_controller_does_not_advance() {
    let mut controller = make_controller(&[&[1, 1]], PlaybackConfig::default());
    controller.start(0);
    let token = controller.run_token().unwrap();
    assert!(controller.stop());
    assert!(!controller.stop());

    assert_eq!(controller.advance(token, 0), Step::Stopped);
    assert!(controller.visual().read_log().is_empty());
}

#[test]
fn empty_document_never_starts() {
    let mut controller = make_controller(&[], PlaybackConfig::default());

    assert!(!controller.start(0));
    assert!(!controller.is_running());
    assert_eq!(controller.cursor_id(), None);
    assert_eq!(controller.time_remaining_ms(), 0.0);
}

#[test]
fn invalid_pace_keeps_previous_value() {
    let mut controller = make_controller(&[&[1, 1]], PlaybackConfig::default());
    let before = controller.budget().clone();

    assert_eq!(controller.set_pace(0.0), Err(PlaybackError::InvalidPace));
    assert_eq!(controller.set_pace(-5.0), Err(PlaybackError::InvalidPace));
    assert_eq!(controller.config().wpm, 450.0);
    assert_eq!(controller.budget(), &before);
}

#[test]
fn pace_and_pause_changes_rebuild_budget() {
    let mut controller = make_controller(&[&[1, 1], &[1, 1]], single_word_config(60.0, 0));
    assert_close(controller.budget().total_ms(), 4_000.0);

    controller.set_pace(120.0).unwrap();
    assert_close(controller.budget().total_ms(), 2_000.0);

    controller.set_pause_ms(250);
    assert_close(controller.budget().total_ms(), 1_500.0);
}

#[test]
fn adjust_pace_steps_within_bounds() {
    let config = PlaybackConfig {
        max_wpm: 455.0,
        ..PlaybackConfig::default()
    };
    let mut controller = make_controller(&[&[1]], config);

    assert!(controller.adjust_pace(true));
    assert_eq!(controller.config().wpm, 455.0);
    assert!(!controller.adjust_pace(true));
    assert!(controller.adjust_pace(false));
    assert_eq!(controller.config().wpm, 445.0);
}

#[test]
fn remaining_time_follows_cursor() {
    // 8 words at 60 wpm, no pause: 1 s per word.
    let mut controller =
        make_controller(&[&[1, 1, 1, 1], &[1, 1, 1, 1]], single_word_config(60.0, 0));
    assert_close(controller.time_remaining_ms(), 8_000.0);

    controller.seek("w2", 0).unwrap();
    assert_close(controller.time_remaining_ms(), 6_000.0);

    controller.seek("w5", 0).unwrap();
    assert_close(controller.time_remaining_ms(), 3_000.0);
}

#[test]
fn remaining_time_resets_after_finishing() {
    let mut controller = make_controller(&[&[1, 1]], single_word_config(60.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();
    controller.advance(token, 0);
    controller.advance(token, 1_000);
    assert_eq!(controller.advance(token, 2_000), Step::Finished);

    assert_eq!(controller.cursor_id(), None);
    assert_close(controller.time_remaining_ms(), controller.budget().total_ms());
}

#[test]
fn start_after_finishing_stays_finished() {
    let mut controller = make_controller(&[&[1, 1]], single_word_config(60.0, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();
    controller.advance(token, 0);
    controller.advance(token, 0);
    controller.advance(token, 0);

    assert!(!controller.start(100));
    assert!(!controller.is_running());
    assert_eq!(controller.cursor_id(), None);
    assert_eq!(controller.visual().mark("w1"), WordMark::Read);

    // A seek gives the cursor a word again.
    controller.seek("w0", 200).unwrap();
    assert!(controller.start(200));
}

#[test]
fn hold_during_final_pause_does_not_replay() {
    let mut controller = make_controller(&[&[1, 1], &[1, 1]], single_word_config(60.0, 200));
    let mut gesture = crate::gesture::GestureDisambiguator::new();
    controller.start(0);
    let token = controller.run_token().unwrap();
    for now_ms in [0, 800, 2_000, 2_800] {
        controller.advance(token, now_ms);
    }
    assert!(controller.is_running());
    assert_eq!(controller.cursor_id(), None);

    gesture.press(3_000, &mut controller);
    gesture.release(3_400, &mut controller);

    assert!(!controller.is_running());
    assert_eq!(controller.cursor_id(), None);
    for id in ids(0..=3) {
        assert_eq!(controller.visual().mark(&id), WordMark::Read, "{id}");
    }
    assert_eq!(controller.advance(token, 3_400), Step::Stopped);
}

#[test]
fn near_zero_pace_caps_the_wait() {
    let mut controller = make_controller(&[&[1, 1]], single_word_config(1e-12, 0));
    controller.start(0);
    let token = controller.run_token().unwrap();

    assert_eq!(controller.advance(token, 0), Step::Wait { delay_ms: MAX_DELAY_MS });
}

#[test]
fn activating_a_word_pauses_and_selects_it() {
    let mut controller = make_controller(&[&[1, 1, 1]], single_word_config(450.0, 0));
    controller.start(0);

    controller.activate_word("w2", 40).unwrap();
    assert!(!controller.is_running());
    assert_eq!(controller.cursor_id(), Some("w2"));
    assert_eq!(controller.visual().selected(), Some("w2"));

    assert_eq!(controller.activate_word("zzz", 50), Err(PlaybackError::UnknownWord));
    assert_eq!(controller.visual().selected(), Some("w2"));

    controller.start(60);
    assert_eq!(controller.visual().selected(), None);
}

#[test]
fn driving_to_completion_marks_each_word_once_in_order() {
    let config = PlaybackConfig::default()
        .with_wpm(60.0)
        .with_pause_ms(200)
        .with_chunk_char_budget(9);
    let controller = RefCell::new(make_controller(&[&[3, 4, 2, 5], &[1], &[6, 6, 2]], config));
    controller.borrow_mut().start(0);
    let mut pacer = SimulatedPacer::new();

    let outcome = embassy_futures::block_on(drive(&controller, &mut pacer));

    assert_eq!(outcome, DriveOutcome::Finished);
    let controller = controller.borrow();
    assert!(!controller.is_running());
    assert_eq!(controller.cursor_id(), None);
    assert_eq!(controller.visual().read_log(), &ids(0..=7)[..]);
    // The effective pace including pauses is the configured one.
    assert!(pacer.now_ms.abs_diff(8_000) <= 8);
}

#[test]
fn simulated_clock_matches_total_duration() {
    let controller = RefCell::new(make_controller(
        &[&[1, 1], &[1, 1]],
        single_word_config(60.0, 200),
    ));
    controller.borrow_mut().start(0);
    let mut pacer = SimulatedPacer::new();

    embassy_futures::block_on(drive(&controller, &mut pacer));

    assert_eq!(pacer.now_ms, 4_000);
    assert_eq!(pacer.waits, 4);
}

#[test]
fn stop_during_wait_halts_without_truncating() {
    let controller = RefCell::new(make_controller(
        &[&[1, 1, 1, 1, 1]],
        single_word_config(60.0, 0),
    ));
    controller.borrow_mut().start(0);
    let mut pacer = SimulatedPacer::stopping(2, &controller);

    let outcome = embassy_futures::block_on(drive(&controller, &mut pacer));

    assert_eq!(outcome, DriveOutcome::Stopped);
    let controller = controller.borrow();
    assert_eq!(controller.visual().read_log(), &ids(0..=1)[..]);
    assert_eq!(controller.cursor_id(), Some("w2"));
}

#[test]
fn drive_without_running_returns_immediately() {
    let controller = RefCell::new(make_controller(&[&[1, 1]], PlaybackConfig::default()));
    let mut pacer = SimulatedPacer::new();

    assert_eq!(
        embassy_futures::block_on(drive(&controller, &mut pacer)),
        DriveOutcome::Stopped
    );
    assert_eq!(pacer.waits, 0);
}
