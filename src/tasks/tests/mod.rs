use super::*;
use crate::error::Error;
use crate::types::Cost;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};


/// Long enough that the background loop never ticks during a test
const MANUAL_POLL_MS: u64 = 60_000;

/// Short enough for loop-driven tests to finish quickly
const FAST_POLL_MS: u64 = 20;

fn controller_for(server: &MockServer, poll_interval_ms: u64) -> TaskController {
    let mut config = Config::with_base_url(server.uri());
    config.polling.poll_interval_ms = poll_interval_ms;
    TaskController::new(config).unwrap()
}

/// Accept exactly one submission and answer with `task_id`
async fn mount_submit(server: &MockServer, task_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"task_id": task_id, "status": "processing"})),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Answer the next status check for `task_id` with `body`
async fn mount_status_once(server: &MockServer, task_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/status/{}", task_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn next_event(rx: &mut broadcast::Receiver<TaskEvent>) -> TaskEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count()
}
