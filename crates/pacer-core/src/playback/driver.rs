//! Async advancement loop.

use core::cell::RefCell;

use log::debug;

use super::{PlaybackController, Step};
use crate::visual::VisualLayer;

/// Clock and timed suspension used by [`drive`].
#[allow(async_fn_in_trait)]
pub trait Pacer {
    fn now_ms(&self) -> u64;

    async fn wait_ms(&mut self, delay_ms: u64);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriveOutcome {
    /// Every word was marked read.
    Finished,
    /// Playback was stopped or restarted under this loop.
    Stopped,
}

/// Run the advancement loop for the current run until it ends.
///
/// The controller is only borrowed between suspension points, so other
/// tasks on the same executor may stop, seek or retune it while this loop
/// waits. Dropping the future is also a clean cancellation: nothing is ever
/// half-marked across an `.await`.
pub async fn drive<V, P>(controller: &RefCell<PlaybackController<V>>, pacer: &mut P) -> DriveOutcome
where
    V: VisualLayer,
    P: Pacer,
{
    let Some(token) = controller.borrow().run_token() else {
        return DriveOutcome::Stopped;
    };

    loop {
        let step = controller.borrow_mut().advance(token, pacer.now_ms());
        match step {
            Step::Wait { delay_ms } => pacer.wait_ms(delay_ms).await,
            Step::Finished => return DriveOutcome::Finished,
            Step::Stopped => {
                debug!("driver: run {:?} ended", token);
                return DriveOutcome::Stopped;
            }
        }
    }
}
