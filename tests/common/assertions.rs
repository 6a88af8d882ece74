//! Custom test assertions for task lifecycle tests

use analyzer_client::{Cost, TaskEvent, TaskId};
use std::time::Duration;
use tokio::sync::broadcast;

/// Result of waiting for a task to end
#[derive(Debug, PartialEq)]
pub enum WaitResult {
    /// Task completed with a result
    Completed {
        /// Result text
        result: String,
        /// Resolved cost
        cost: Cost,
    },
    /// Task failed
    Failed {
        /// Error code
        code: String,
        /// Human-readable message
        message: String,
    },
    /// Timeout waiting for a terminal event
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for the task `id` to reach a terminal event, collecting its progress values
///
/// Events of other tasks are ignored.
pub async fn wait_for_outcome(
    events: &mut broadcast::Receiver<TaskEvent>,
    id: &TaskId,
    timeout: Duration,
) -> (Vec<u8>, WaitResult) {
    let mut progress = Vec::new();

    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(event) if event.task_id() != id => continue,
                Ok(TaskEvent::Progress { progress: p, .. }) => progress.push(p),
                Ok(TaskEvent::Completed { result, cost, .. }) => {
                    return WaitResult::Completed { result, cost };
                }
                Ok(TaskEvent::Failed { code, message, .. }) => {
                    return WaitResult::Failed { code, message };
                }
                Err(_) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await
    .unwrap_or(WaitResult::Timeout);

    (progress, result)
}

/// Assert that a displayed progress sequence never decreases and stays within 0..=100
pub fn assert_monotonic(progress: &[u8]) {
    for pair in progress.windows(2) {
        assert!(pair[0] <= pair[1], "progress went backwards: {:?}", progress);
    }
    assert!(progress.iter().all(|p| *p <= 100), "progress above 100: {:?}", progress);
}
