//! Mock server fixtures

use analyzer_client::Config;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// MIME type of the converted and exported documents
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Config pointing at `server`, polling every `poll_interval_ms`
pub fn test_config(server: &MockServer, poll_interval_ms: u64) -> Config {
    let mut config = Config::with_base_url(server.uri());
    config.polling.poll_interval_ms = poll_interval_ms;
    config
}

/// Accept one submission and answer with `task_id`
pub async fn mount_submission(server: &MockServer, task_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "task_id": task_id,
                "status": "processing",
                "message": "Analysis started"
            })),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Answer successive status checks for `task_id` with `bodies`, in order
///
/// Each body is served exactly once.
pub async fn mount_status_script(server: &MockServer, task_id: &str, bodies: Vec<serde_json::Value>) {
    for body in bodies {
        Mock::given(method("GET"))
            .and(path(format!("/api/status/{}", task_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(1)
            .expect(1)
            .mount(server)
            .await;
    }
}

/// Serve `bytes` as a binary document at `route`
pub async fn mount_document(server: &MockServer, http_method: &str, route: &str, bytes: &[u8], filename: Option<&str>) {
    let mut template = ResponseTemplate::new(200).set_body_raw(bytes.to_vec(), DOCX_MIME);
    if let Some(name) = filename {
        template = template.insert_header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", name).as_str(),
        );
    }

    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}
