//! Task lifecycle controller split into focused submodules.
//!
//! The `TaskController` struct and its methods are organized by concern:
//! - [`submit`] - Input normalisation and task submission
//! - [`poll`] - Single status checks and terminal-state reconciliation
//! - [`polling`] - The repeating, cancellable poll loop
//! - [`export`] - Downloading a finished task's document
//!
//! At most one task is active at a time. The active task lives in a single
//! slot tagged with the handle it belongs to; submission is the only writer
//! that installs a task, and every status response is checked against the
//! slot before it is allowed to change anything.

mod export;
mod poll;
mod polling;
mod submit;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use poll::TASK_ERROR_CODE;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::types::{LifecycleState, TaskEvent, TaskId, TaskSnapshot, TaskStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::{Mutex, broadcast, watch};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Buffer size of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Opaque handle to a submitted task
///
/// Two handles for the same server task id are still distinct if they came
/// from different submissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskHandle {
    id: TaskId,
    generation: u64,
}

impl TaskHandle {
    /// Server-assigned task id
    pub fn id(&self) -> &TaskId {
        &self.id
    }
}

/// The task currently being tracked
pub(crate) struct ActiveTask {
    pub(crate) handle: TaskHandle,
    /// Cancelled when the task ends or is superseded; stops its poll loop
    pub(crate) token: CancellationToken,
    pub(crate) tracker: ProgressTracker,
    pub(crate) status: TaskStatus,
    pub(crate) submitted_at: DateTime<Utc>,
    /// Set while a status check for this task is outstanding
    pub(crate) in_flight: Arc<AtomicBool>,
}

/// Single active-task cell
#[derive(Default)]
pub(crate) struct Slot {
    /// Bumped by every submission; last writer wins
    pub(crate) generation: u64,
    pub(crate) active: Option<ActiveTask>,
}

impl Slot {
    /// The active task, if it belongs to `handle`
    pub(crate) fn active_for(&mut self, handle: &TaskHandle) -> Option<&mut ActiveTask> {
        self.active.as_mut().filter(|task| task.handle == *handle)
    }

    /// Clear the active task and stop its poll loop
    pub(crate) fn finish(&mut self) {
        if let Some(task) = self.active.take() {
            task.token.cancel();
        }
    }
}

/// Client-side controller for submitted analysis tasks (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct TaskController {
    /// Configuration (wrapped in Arc for sharing with poll loops)
    pub(crate) config: Arc<Config>,
    /// HTTP client with the configured request timeout
    pub(crate) http: reqwest::Client,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<TaskEvent>,
    /// Lifecycle state, observable through [`TaskController::watch_state`]
    pub(crate) state_tx: Arc<watch::Sender<LifecycleState>>,
    /// Submission is refused while the gate is closed
    pub(crate) gate: AuthGate,
    /// The single active-task slot
    pub(crate) slot: Arc<Mutex<Slot>>,
}

impl TaskController {
    /// Create a controller whose submissions are always permitted
    pub fn new(config: Config) -> Result<Self> {
        Self::with_gate(config, AuthGate::open())
    }

    /// Create a controller that consults `gate` before every submission
    ///
    /// Share the gate with an [`AuthClient`](crate::auth::AuthClient) to have
    /// password checks control submission.
    pub fn with_gate(config: Config, gate: AuthGate) -> Result<Self> {
        config.validate()?;
        let http = config.http_client()?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, _state_rx) = watch::channel(LifecycleState::Idle);

        Ok(Self {
            config: Arc::new(config),
            http,
            event_tx,
            state_tx: Arc::new(state_tx),
            gate,
            slot: Arc::new(Mutex::new(Slot::default())),
        })
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Subscribe to task events
    ///
    /// Each subscriber receives every event independently. A subscriber that
    /// falls more than 1000 events behind receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use analyzer_client::{Config, TaskController, TaskEvent};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let controller = TaskController::new(Config::default())?;
    ///     let mut events = controller.subscribe();
    ///
    ///     controller.submit("https://example.com").await?;
    ///     while let Ok(event) = events.recv().await {
    ///         if let TaskEvent::Progress { progress, .. } = &event {
    ///             tracing::info!(progress, "analysis running");
    ///         }
    ///         if event.is_terminal() {
    ///             break;
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_tx.subscribe()
    }

    /// Task events as a stream, skipping anything lost to lag
    pub fn events(&self) -> impl Stream<Item = TaskEvent> + Send + 'static {
        BroadcastStream::new(self.event_tx.subscribe()).filter_map(|item| item.ok())
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state_tx.borrow().clone()
    }

    /// Receiver notified on every lifecycle transition
    pub fn watch_state(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    /// Return a `Completed` or `Failed` controller to `Idle`
    ///
    /// Returns `false` and changes nothing in any other state.
    pub fn acknowledge(&self) -> bool {
        self.state_tx.send_if_modified(|state| {
            if state.is_terminal() {
                *state = LifecycleState::Idle;
                true
            } else {
                false
            }
        })
    }

    /// Snapshot of the active task, if any
    pub async fn active_task(&self) -> Option<TaskSnapshot> {
        let slot = self.slot.lock().await;
        slot.active.as_ref().map(|task| TaskSnapshot {
            task_id: task.handle.id.clone(),
            status: task.status,
            progress: task.tracker.displayed(),
            message: task.tracker.message().map(str::to_string),
            submitted_at: task.submitted_at,
        })
    }

    /// Emit an event to all subscribers
    ///
    /// Events are dropped silently when nobody is listening.
    pub(crate) fn emit_event(&self, event: TaskEvent) {
        self.event_tx.send(event).ok();
    }

    pub(crate) fn set_state(&self, state: LifecycleState) {
        self.state_tx.send_replace(state);
    }
}
