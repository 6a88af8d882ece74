//! End-to-end tests of the conversion flow against a mock server

mod common;

use analyzer_client::conversion::{BlockStyle, Spacing};
use analyzer_client::{
    Config, ConversionClient, ConversionOptions, ConversionOutcome, ConversionRequest, Engine,
    SourceFile,
};
use common::{DOCX_MIME, mount_document};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_markdown_file_converts_and_saves() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains(r#"name="file"; filename="notes.md""#))
        .and(body_string_contains("# Weekly notes"))
        .and(body_string_contains(r#""heading1":{"before":18.0,"after":8.0}"#))
        .and(body_string_contains(r#""list_marker":"disc""#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"PK\x03\x04converted".to_vec(), DOCX_MIME)
                .insert_header(
                    "Content-Disposition",
                    "attachment; filename*=UTF-8''weekly%20notes.docx",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("notes.md");
    tokio::fs::write(&source, "# Weekly notes\n\n- item").await.unwrap();

    let mut options = ConversionOptions::default();
    options.spacing.set(BlockStyle::Heading1, Spacing::new(18.0, 8.0));

    let client = ConversionClient::new(Config::with_base_url(server.uri())).unwrap();
    let request = ConversionRequest::build(
        SourceFile::from_path(&source).await.unwrap(),
        Engine::Primary,
        options,
    )
    .unwrap();

    let document = match client.send(&request).await {
        ConversionOutcome::Downloaded(document) => document,
        other => panic!("expected download, got {:?}", other),
    };
    assert_eq!(document.filename, "weekly notes.docx");

    let out = tempfile::tempdir().unwrap();
    let saved = document.save_to(out.path()).await.unwrap();
    assert_eq!(saved, out.path().join("weekly notes.docx"));
    assert_eq!(std::fs::read(saved).unwrap(), b"PK\x03\x04converted");
}

#[tokio::test]
async fn test_engine_defaults_still_send_out_of_range_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert"))
        .and(body_string_contains("\r\n\r\ntrue\r\n"))
        .and(body_string_contains(r#""body_font_size":500"#))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"DOC".to_vec(), DOCX_MIME))
        .expect(1)
        .mount(&server)
        .await;

    let mut options = ConversionOptions {
        use_engine_default_formatting: true,
        ..Default::default()
    };
    options.formatting.body_font_size = 500;
    options.formatting.line_spacing = 40.0;

    let client = ConversionClient::new(Config::with_base_url(server.uri())).unwrap();
    let request = ConversionRequest::build(
        SourceFile::new("report.md", b"# Report".to_vec()),
        Engine::Primary,
        options,
    )
    .unwrap();

    match client.send(&request).await {
        ConversionOutcome::Downloaded(document) => {
            assert_eq!(document.filename, "report_converted.docx")
        }
        other => panic!("expected download, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_attempt_is_retried_with_new_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_alt"))
        .and(body_string_contains("broken.md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "bad markdown"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/convert_alt"))
        .and(body_string_contains("fixed.md"))
        .and(body_string_contains("alternate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"DOC".to_vec(), DOCX_MIME))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConversionClient::new(Config::with_base_url(server.uri())).unwrap();
    let request = ConversionRequest::build(
        SourceFile::new("broken.md", b"**".to_vec()),
        Engine::Alternate,
        ConversionOptions::default(),
    )
    .unwrap();

    let outcome = client.send(&request).await;
    assert_eq!(
        outcome,
        ConversionOutcome::Failed {
            code: "server_error".to_string(),
            message: "bad markdown".to_string(),
        }
    );

    let retried = request
        .with_file(SourceFile::new("fixed.md", b"# Fixed".to_vec()))
        .unwrap();
    let outcome = client.send(&retried).await;
    assert!(outcome.is_downloaded());
}

#[tokio::test]
async fn test_document_route_fixture_for_alternate_engine() {
    let server = MockServer::start().await;
    mount_document(&server, "POST", "/api/convert_alt", b"ALT", Some("server-name.docx")).await;

    let client = ConversionClient::new(Config::with_base_url(server.uri())).unwrap();
    let request = ConversionRequest::build(
        SourceFile::new("a.md", b"a".to_vec()),
        Engine::Alternate,
        ConversionOptions::default(),
    )
    .unwrap();

    let document = client.try_send(&request).await.unwrap();
    assert_eq!(document.filename, "server-name.docx");
    assert_eq!(document.bytes.as_ref(), b"ALT");
}
