//! Repeating poll loop

use super::{TaskController, TaskHandle};
use crate::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl TaskController {
    /// Spawn the fixed-interval poll loop for a freshly submitted task
    ///
    /// The first check happens one interval after submission. Each check is
    /// awaited before the next tick is considered and missed ticks are
    /// skipped. A tick that finds another caller's check still outstanding is
    /// skipped too. The loop ends on a terminal event, on any other error, or
    /// when `token` is cancelled.
    pub(crate) fn spawn_poll_loop(
        &self,
        handle: TaskHandle,
        token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let controller = self.clone();
        let period = self.config.poll_interval();

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!(task_id = %handle.id, "poll loop cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        match controller.poll(&handle).await {
                            Ok(event) if !event.is_terminal() => {}
                            Ok(_) => break,
                            Err(Error::PollInFlight { .. }) => {
                                debug!(task_id = %handle.id, "previous status check still running, skipping tick");
                            }
                            Err(e) => {
                                debug!(task_id = %handle.id, error = %e, "poll loop stopped");
                                break;
                            }
                        }
                    }
                }
            }
        })
    }
}
