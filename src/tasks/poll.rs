//! Single status checks and terminal-state reconciliation

use super::{ActiveTask, TaskController, TaskHandle};
use crate::error::{Error, Result};
use crate::response::classify_status;
use crate::types::{LifecycleState, StatusPayload, TaskEvent, TaskStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Error code of a `Failed` event for a task the server reported as failed
pub const TASK_ERROR_CODE: &str = "task_error";

impl TaskController {
    /// Issue one status check for `handle`
    ///
    /// Returns the event produced by the response: `Progress` while the task
    /// runs, `Completed` with the result and resolved cost, or `Failed` when
    /// the server reports the task failed. Every returned event has already
    /// been broadcast to subscribers.
    ///
    /// A terminal event or an error clears the active task and stops its poll
    /// loop, except for two rejections that broadcast nothing:
    /// [`Error::TaskSuperseded`] for a handle that is no longer active, whose
    /// response is discarded without touching the newer task, and
    /// [`Error::PollInFlight`] while another check for the same task is still
    /// outstanding, in which case no request is sent.
    pub async fn poll(&self, handle: &TaskHandle) -> Result<TaskEvent> {
        let _in_flight = {
            let mut slot = self.slot.lock().await;
            let Some(task) = slot.active_for(handle) else {
                return Err(Error::TaskSuperseded {
                    task_id: handle.id.clone(),
                });
            };
            if task.in_flight.swap(true, Ordering::AcqRel) {
                debug!(task_id = %handle.id, "status check already in flight");
                return Err(Error::PollInFlight {
                    task_id: handle.id.clone(),
                });
            }
            InFlight(Arc::clone(&task.in_flight))
        };

        debug!(task_id = %handle.id, "checking task status");
        let fetched = self.fetch_status(handle).await;
        self.settle(handle, fetched).await
    }

    async fn fetch_status(&self, handle: &TaskHandle) -> Result<StatusPayload> {
        let url = self
            .config
            .endpoint_url_with_segment(&self.config.endpoints.status_path, handle.id.as_str());
        let response = self.http.get(&url).send().await?;

        let value = classify_status(response).await?.into_json()?;
        serde_json::from_value(value)
            .map_err(|e| Error::Protocol(format!("invalid status payload: {}", e)))
    }

    /// Apply a status response to the slot, if it still belongs to `handle`
    async fn settle(&self, handle: &TaskHandle, fetched: Result<StatusPayload>) -> Result<TaskEvent> {
        let mut slot = self.slot.lock().await;
        let Some(task) = slot.active_for(handle) else {
            debug!(task_id = %handle.id, "discarding status response for superseded task");
            return Err(Error::TaskSuperseded {
                task_id: handle.id.clone(),
            });
        };

        let outcome = fetched.and_then(|payload| task.apply(payload));

        // Broadcasting while the slot is held keeps events in slot order.
        match outcome {
            Ok(event) if !event.is_terminal() => {
                self.emit_event(event.clone());
                Ok(event)
            }
            Ok(event) => {
                slot.finish();
                match &event {
                    TaskEvent::Completed { cost, .. } => {
                        info!(task_id = %handle.id, cost = %cost, "task completed");
                        self.set_state(LifecycleState::Completed {
                            task_id: handle.id.clone(),
                        });
                    }
                    TaskEvent::Failed { message, .. } => {
                        info!(task_id = %handle.id, message = %message, "task failed on the server");
                        self.set_state(LifecycleState::Failed {
                            message: message.clone(),
                        });
                    }
                    TaskEvent::Progress { .. } => {}
                }
                self.emit_event(event.clone());
                Ok(event)
            }
            Err(e) if !e.ends_active_task() => Err(e),
            Err(e) => {
                slot.finish();
                warn!(task_id = %handle.id, error = %e, "status check failed");
                let message = e.user_message();
                self.set_state(LifecycleState::Failed {
                    message: message.clone(),
                });
                self.emit_event(TaskEvent::Failed {
                    task_id: handle.id.clone(),
                    code: e.error_code().to_string(),
                    message,
                });
                Err(e)
            }
        }
    }
}

/// Clears a task's in-flight flag when its status check ends
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ActiveTask {
    /// Fold one status payload into the task and build the resulting event
    fn apply(&mut self, payload: StatusPayload) -> Result<TaskEvent> {
        let task_id = self.handle.id.clone();
        self.status = payload.status;

        match payload.status {
            TaskStatus::Submitted | TaskStatus::Processing => {
                let progress = self
                    .tracker
                    .apply(payload.reported_progress(), payload.message.clone());
                Ok(TaskEvent::Progress {
                    task_id,
                    progress,
                    message: self.tracker.message().map(str::to_string),
                })
            }
            TaskStatus::Completed => {
                let Some(result) = payload.result_text() else {
                    return Err(Error::MissingResult { task_id });
                };
                Ok(TaskEvent::Completed {
                    result: result.to_string(),
                    cost: payload.resolve_cost(),
                    task_id,
                })
            }
            TaskStatus::Error => Ok(TaskEvent::Failed {
                task_id,
                code: TASK_ERROR_CODE.to_string(),
                message: payload
                    .failure_message()
                    .unwrap_or("task failed")
                    .to_string(),
            }),
            TaskStatus::Unknown => Err(Error::Protocol("unknown task status".to_string())),
        }
    }
}
