//! Task submission

use super::{ActiveTask, TaskController, TaskHandle};
use crate::error::{Error, Result};
use crate::progress::ProgressTracker;
use crate::response::{ResponseClass, classify};
use crate::types::{LifecycleState, SubmitResponse, TaskId, TaskStatus};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct SubmitRequest<'a> {
    url: &'a str,
}

impl TaskController {
    /// Submit a URL for analysis and start polling it
    ///
    /// The input is trimmed and given an `https://` scheme if it has none.
    /// Submitting always supersedes the previously active task: its poll
    /// loop stops and none of its later responses reach subscribers.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthorized`] while the auth gate is closed
    /// - [`Error::Submission`] for empty or invalid input (no request is sent),
    ///   a server rejection, a failure status or a non-JSON response
    /// - [`Error::Protocol`] when the response lacks a task id
    /// - [`Error::TaskSuperseded`] when a newer submission started while this
    ///   one was in flight
    pub async fn submit(&self, input: &str) -> Result<TaskHandle> {
        if !self.gate.is_open() {
            return Err(Error::NotAuthorized);
        }
        let url = normalize_url(input)?;

        let generation = {
            let mut slot = self.slot.lock().await;
            slot.generation += 1;
            if let Some(previous) = slot.active.as_ref() {
                debug!(task_id = %previous.handle.id, "superseding active task");
            }
            slot.finish();
            self.set_state(LifecycleState::Submitting);
            slot.generation
        };

        let submitted = self.request_task(&url).await;

        let mut slot = self.slot.lock().await;
        let latest = slot.generation == generation;

        let task_id = match submitted {
            Ok(task_id) => task_id,
            Err(e) => {
                if latest {
                    self.set_state(LifecycleState::Failed {
                        message: e.user_message(),
                    });
                }
                warn!(url = %url, error = %e, "task submission failed");
                return Err(e);
            }
        };

        if !latest {
            debug!(task_id = %task_id, "submission overtaken by a newer one");
            return Err(Error::TaskSuperseded { task_id });
        }

        let handle = TaskHandle {
            id: task_id,
            generation,
        };
        let token = CancellationToken::new();
        slot.active = Some(ActiveTask {
            handle: handle.clone(),
            token: token.clone(),
            tracker: ProgressTracker::new(),
            status: TaskStatus::Submitted,
            submitted_at: chrono::Utc::now(),
            in_flight: Arc::default(),
        });
        self.set_state(LifecycleState::Polling {
            task_id: handle.id.clone(),
        });
        drop(slot);

        self.spawn_poll_loop(handle.clone(), token);
        info!(task_id = %handle.id, url = %url, "task submitted");

        Ok(handle)
    }

    /// POST the URL and extract the task id
    async fn request_task(&self, url: &str) -> Result<TaskId> {
        let endpoint = self.config.endpoint_url(&self.config.endpoints.analyze_path);
        let response = self
            .http
            .post(&endpoint)
            .json(&SubmitRequest { url })
            .send()
            .await?;

        match classify(response).await? {
            ResponseClass::JsonSuccess(value) => {
                let body: SubmitResponse = serde_json::from_value(value)
                    .map_err(|_| Error::Protocol("submission response has no task_id".to_string()))?;
                let task_id = body.task_id.trim();
                if task_id.is_empty() {
                    return Err(Error::Protocol("submission response has an empty task_id".to_string()));
                }
                Ok(TaskId::from(task_id))
            }
            ResponseClass::JsonError { message, .. } => Err(Error::Submission(message)),
            ResponseClass::Unclassifiable { status } => {
                Err(Error::Submission(Error::transport(status).user_message()))
            }
            ResponseClass::Binary { .. } => Err(Error::Submission("non-JSON response".to_string())),
        }
    }
}

/// Trim the input and make sure it is an http(s) URL with a host
pub(crate) fn normalize_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Submission("URL must not be empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let invalid = || Error::Submission("invalid URL".to_string());
    let parsed = url::Url::parse(&candidate).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }

    Ok(candidate)
}
