use core::cell::RefCell;

use embassy_futures::select::{Either, Either3, select, select3};
use embassy_sync::{blocking_mutex::raw::NoopRawMutex, signal::Signal};
use embassy_time::{Duration, Instant, Ticker, Timer};
use log::{info, warn};
use pacer_core::{
    gesture::{Gesture, GestureDisambiguator},
    playback::{
        PlaybackController,
        driver::{DriveOutcome, Pacer, drive},
    },
    text_policy::{remaining_label, remaining_minutes},
    visual::VisualLayer,
};

use super::commands::{Command, CommandChannel};

type Wake = Signal<NoopRawMutex, ()>;

/// Milliseconds since the session began, on the embassy time driver.
#[derive(Clone, Copy, Debug)]
pub(super) struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub(super) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Pacer for SessionClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis()
    }

    async fn wait_ms(&mut self, delay_ms: u64) {
        Timer::after_millis(delay_ms).await;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum SessionEnd {
    Finished,
    Quit,
}

/// What the playback loop has to do after a command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Reaction {
    Idle,
    /// A new run began or the cursor moved under a live run.
    Wake,
    Quit,
}

/// Play until the document is read through, `quit` arrives, or input closes
/// while paused.
pub(super) async fn run<V: VisualLayer>(
    controller: &RefCell<PlaybackController<V>>,
    commands: &CommandChannel,
    clock: SessionClock,
    status_every: Option<Duration>,
) -> SessionEnd {
    let wake = Wake::new();
    log_status(&controller.borrow());

    match select3(
        playback_loop(controller, &wake, clock),
        command_loop(controller, commands, &wake, clock),
        status_loop(controller, status_every),
    )
    .await
    {
        Either3::First(()) => {
            log_status(&controller.borrow());
            SessionEnd::Finished
        }
        Either3::Second(()) => SessionEnd::Quit,
        Either3::Third(never) => match never {},
    }
}

async fn playback_loop<V: VisualLayer>(
    controller: &RefCell<PlaybackController<V>>,
    wake: &Wake,
    mut clock: SessionClock,
) {
    loop {
        if !controller.borrow().is_running() {
            if controller.borrow().cursor_id().is_none() {
                return;
            }
            wake.wait().await;
            continue;
        }

        match select(drive(controller, &mut clock), wake.wait()).await {
            Either::First(DriveOutcome::Finished) => return,
            Either::First(DriveOutcome::Stopped) => {}
            // Restarted or repositioned: drop the stale wait and tick now.
            Either::Second(()) => {}
        }
    }
}

async fn command_loop<V: VisualLayer>(
    controller: &RefCell<PlaybackController<V>>,
    commands: &CommandChannel,
    wake: &Wake,
    clock: SessionClock,
) {
    let mut gesture = GestureDisambiguator::new();

    loop {
        let command = commands.receive().await;
        let reaction = apply(
            &command,
            &mut controller.borrow_mut(),
            &mut gesture,
            clock.now_ms(),
        );

        match reaction {
            Reaction::Idle => {}
            Reaction::Wake => wake.signal(()),
            Reaction::Quit => return,
        }
    }
}

async fn status_loop<V: VisualLayer>(
    controller: &RefCell<PlaybackController<V>>,
    every: Option<Duration>,
) -> core::convert::Infallible {
    let Some(every) = every else {
        return core::future::pending().await;
    };

    let mut ticker = Ticker::every(every);
    loop {
        ticker.next().await;
        log_status(&controller.borrow());
    }
}

fn apply<V: VisualLayer>(
    command: &Command,
    controller: &mut PlaybackController<V>,
    gesture: &mut GestureDisambiguator,
    now_ms: u64,
) -> Reaction {
    match command {
        Command::Press => {
            gesture.press(now_ms, controller);
            Reaction::Idle
        }
        Command::Release => {
            let released = gesture.release(now_ms, controller);
            if released.is_some_and(|g| g != Gesture::Tap) {
                Reaction::Wake
            } else {
                Reaction::Idle
            }
        }
        Command::Tap => {
            gesture.press(now_ms, controller);
            match gesture.release(now_ms, controller) {
                Some(Gesture::Resume) => Reaction::Wake,
                _ => Reaction::Idle,
            }
        }
        Command::Seek(word_id) => match controller.seek(word_id, now_ms) {
            Ok(()) if controller.is_running() => Reaction::Wake,
            Ok(()) => Reaction::Idle,
            Err(err) => {
                warn!("seek {}: {}", word_id, err);
                Reaction::Idle
            }
        },
        Command::Select(word_id) => {
            if let Err(err) = controller.activate_word(word_id, now_ms) {
                warn!("select {}: {}", word_id, err);
            }
            Reaction::Idle
        }
        Command::Pace(wpm) => {
            if let Err(err) = controller.set_pace(*wpm) {
                warn!("pace {}: {}", wpm, err);
            }
            Reaction::Idle
        }
        Command::Faster | Command::Slower => {
            if !controller.adjust_pace(*command == Command::Faster) {
                info!("pace stays at {} wpm", controller.config().wpm);
            }
            Reaction::Idle
        }
        Command::PauseMs(pause_ms) => {
            controller.set_pause_ms(*pause_ms);
            Reaction::Idle
        }
        Command::Chunk(chars) => {
            controller.set_chunk_char_budget(*chars);
            Reaction::Idle
        }
        Command::Status => {
            log_status(controller);
            Reaction::Idle
        }
        Command::Quit => Reaction::Quit,
        // Nobody is left to resume a paused session.
        Command::InputClosed if controller.is_running() => Reaction::Idle,
        Command::InputClosed => {
            info!("input closed while paused");
            Reaction::Quit
        }
    }
}

fn log_status<V: VisualLayer>(controller: &PlaybackController<V>) {
    let remaining_ms = controller.time_remaining_ms();
    info!(
        "{}: {} left (~{} min) at {} wpm, {} at {}",
        controller.title().unwrap_or("untitled"),
        remaining_label(remaining_ms),
        remaining_minutes(remaining_ms),
        controller.config().wpm,
        if controller.is_running() { "playing" } else { "paused" },
        controller.cursor_id().unwrap_or("end"),
    );
}
