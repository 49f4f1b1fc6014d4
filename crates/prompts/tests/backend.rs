use std::path::Path;

use cad_builder_prompts::{generate_prompt_record, HostedBackend, LocalBackend, PromptError, PromptTemplates};
use cad_builder_test_data::{CannedResponse, Method, TestServer, PNG_PIXEL};

const CHAT_PATH: &str = "/v1/chat/completions";

fn chat_reply(content: &str) -> CannedResponse {
    let body = serde_json::json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    });
    CannedResponse::post(CHAT_PATH, body.to_string())
}

fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder().no_proxy().build().unwrap()
}

fn write_views(dir: &Path, count: usize) {
    for i in 0..count {
        std::fs::write(dir.join(format!("view_{i}.png")), PNG_PIXEL).unwrap();
    }
}

#[test]
fn hosted_backend_inlines_views_and_sends_one_request_per_template() {
    let server = TestServer::start(vec![
        chat_reply("prompt_beginner: \"Ein Würfel\""),
        chat_reply("prompt_intermediate: \"Würfel mit 20 mm Kantenlänge\""),
    ]);
    let views = tempfile::tempdir().unwrap();
    write_views(views.path(), 6);

    let backend = HostedBackend::with_client(client(), server.url(CHAT_PATH), "test-model", Some("token".into()));
    let record = generate_prompt_record(&backend, views.path(), &PromptTemplates::default()).unwrap();

    assert_eq!("Ein Würfel", record.prompt_beginner);
    assert_eq!("Würfel mit 20 mm Kantenlänge", record.prompt_intermediate);

    let requests = server.requests();
    assert_eq!(2, requests.len());
    for request in &requests {
        assert_eq!("POST", request.method.as_str());
        assert_eq!(CHAT_PATH, request.path);
        assert_eq!(Some("Bearer token"), request.header("authorization"));
        assert_eq!(Some("application/json"), request.header("content-type"));
    }
    let first: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!("test-model", first["model"]);
    assert!(first.get("max_tokens").is_none());
    let content = first["messages"][0]["content"].as_array().unwrap();
    assert_eq!(7, content.len());
    assert_eq!("image_url", content[0]["type"]);
    assert!(content[0]["image_url"]["url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,iVBORw0KGgo"));
    assert!(content[6]["text"].as_str().unwrap().contains("Prompt beginner:"));
    assert!(requests[1].body.contains("Prompt intermediate:"));
}

#[test]
fn local_backend_references_files_and_caps_tokens() {
    let server = TestServer::start(vec![
        chat_reply("prompt_beginner: \"Eine Platte\""),
        chat_reply("prompt_intermediate: \"Platte 100 x 50 x 5 mm\""),
    ]);
    let views = tempfile::tempdir().unwrap();
    write_views(views.path(), 2);

    let backend = LocalBackend::with_client(client(), server.url(CHAT_PATH), "local-model", 200);
    let record = generate_prompt_record(&backend, views.path(), &PromptTemplates::default()).unwrap();
    assert_eq!("Platte 100 x 50 x 5 mm", record.prompt_intermediate);

    let requests = server.requests();
    assert_eq!(2, requests.len());
    assert_eq!("POST", requests[0].method.as_str());
    assert_eq!(None, requests[0].header("authorization"));
    let first: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(200, first["max_tokens"]);
    let content = first["messages"][0]["content"].as_array().unwrap();
    assert_eq!("image", content[0]["type"]);
    let expected = format!("file://{}", views.path().join("view_0.png").display());
    assert_eq!(expected.as_str(), content[0]["image"]);
}

#[test]
fn failed_call_aborts_generation() {
    let server = TestServer::start(vec![CannedResponse::new(
        Method::POST,
        CHAT_PATH,
        503,
        "overloaded",
    )]);
    let views = tempfile::tempdir().unwrap();
    write_views(views.path(), 1);

    let backend = HostedBackend::with_client(client(), server.url(CHAT_PATH), "test-model", None);
    let err = generate_prompt_record(&backend, views.path(), &PromptTemplates::default()).unwrap_err();
    assert!(matches!(err, PromptError::Http { .. }));
    assert_eq!(1, server.requests().len());
}

#[test]
fn endpoint_that_only_answers_get_rejects_the_request() {
    let server = TestServer::start(vec![CannedResponse::get(CHAT_PATH, "{}")]);
    let views = tempfile::tempdir().unwrap();
    write_views(views.path(), 1);

    let backend = HostedBackend::with_client(client(), server.url(CHAT_PATH), "test-model", None);
    let err = generate_prompt_record(&backend, views.path(), &PromptTemplates::default()).unwrap_err();
    match err {
        PromptError::Http { source, .. } => assert_eq!(Some(405), source.status().map(|s| s.as_u16())),
        other => panic!("unexpected {other:?}"),
    }
    assert!(server.requests().is_empty());
}

#[test]
fn malformed_answer_is_a_format_error() {
    let server = TestServer::start(vec![chat_reply("Ein Würfel")]);
    let views = tempfile::tempdir().unwrap();
    write_views(views.path(), 1);

    let backend = HostedBackend::with_client(client(), server.url(CHAT_PATH), "test-model", None);
    let err = generate_prompt_record(&backend, views.path(), &PromptTemplates::default()).unwrap_err();
    assert!(matches!(err, PromptError::Format { .. }));
}

#[test]
fn empty_view_directory_is_rejected_before_any_request() {
    let server = TestServer::start(Vec::new());
    let views = tempfile::tempdir().unwrap();

    let backend = HostedBackend::with_client(client(), server.url(CHAT_PATH), "test-model", None);
    let err = generate_prompt_record(&backend, views.path(), &PromptTemplates::default()).unwrap_err();
    assert!(matches!(err, PromptError::NoImages { .. }));
    assert!(server.requests().is_empty());
}
