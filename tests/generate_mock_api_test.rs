//! Mock API tests for the generate flow.
//!
//! Exercises `describe`/`elaborate` against a wiremock server speaking the
//! NDJSON streaming format of `POST /api/generate`.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ollama_vision::{
    ClientConfig, GenerationError, GenerationOptions, GenerationOverrides, ModelConfig,
    OllamaVisionClient,
};

fn ndjson(lines: &[serde_json::Value]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

fn streaming_response(lines: &[serde_json::Value]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(ndjson(lines), "application/x-ndjson")
}

fn media_dir_with(files: &[(&str, &[u8])]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, data) in files {
        std::fs::write(dir.path().join(name), data).unwrap();
    }
    dir
}

#[tokio::test]
async fn describe_streams_and_concatenates_fragments() {
    let mock_server = MockServer::start().await;
    let media = media_dir_with(&[("front.jpg", b"jpeg-bytes")]);

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "moondream",
            "prompt": "Describe the person.",
            "stream": true,
            "keep_alive": -1,
            "images": [STANDARD.encode(b"jpeg-bytes")],
        })))
        .respond_with(streaming_response(&[
            json!({"response": "A person", "done": false}),
            json!({"response": " at the door.", "done": true}),
        ]))
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new(&mock_server.uri(), "moondream"))
            .with_media_root(media.path()),
    );

    let description = client
        .describe(
            &["front.jpg".to_string()],
            "Describe the person.",
            &GenerationOverrides::new(),
        )
        .await
        .unwrap();
    assert_eq!(description, "A person at the door.");
}

#[tokio::test]
async fn describe_sends_images_in_input_order() {
    let mock_server = MockServer::start().await;
    let media = media_dir_with(&[("one.jpg", b"first"), ("two.jpg", b"second")]);

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(streaming_response(&[
            json!({"response": "Two views.", "done": true}),
        ]))
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new(&mock_server.uri(), "moondream"))
            .with_media_root(media.path()),
    );

    client
        .describe(
            &["one.jpg".to_string(), "two.jpg".to_string()],
            "Compare.",
            &GenerationOverrides::new(),
        )
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(
        body["images"],
        json!([STANDARD.encode(b"first"), STANDARD.encode(b"second")])
    );
}

#[tokio::test]
async fn describe_surfaces_non_200_with_body_text() {
    let mock_server = MockServer::start().await;
    let media = media_dir_with(&[("front.jpg", b"jpeg-bytes")]);

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"error":"model 'moondream' not found"}"#),
        )
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new(&mock_server.uri(), "moondream"))
            .with_media_root(media.path()),
    );

    let error = client
        .describe(
            &["front.jpg".to_string()],
            "Describe.",
            &GenerationOverrides::new(),
        )
        .await
        .unwrap_err();
    match error {
        GenerationError::BadResponse { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("expected BadResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn describe_aborts_whole_batch_on_one_failing_reference() {
    let mock_server = MockServer::start().await;
    let media = media_dir_with(&[("one.jpg", b"first"), ("two.jpg", b"second")]);

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(streaming_response(&[json!({"response": "x", "done": true})]))
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new(&mock_server.uri(), "moondream"))
            .with_media_root(media.path()),
    );

    let error = client
        .describe(
            &[
                "one.jpg".to_string(),
                "two.jpg".to_string(),
                "missing.jpg".to_string(),
            ],
            "Compare.",
            &GenerationOverrides::new(),
        )
        .await
        .unwrap_err();
    match error {
        GenerationError::Acquisition(acquisition) => {
            assert_eq!(acquisition.reference(), "missing.jpg");
        }
        other => panic!("expected Acquisition, got {other:?}"),
    }

    // No partial request went out.
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn describe_fetches_internal_references_against_the_internal_api() {
    let internal_server = MockServer::start().await;
    let vision_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/camera_proxy/camera.front"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"proxy-bytes".to_vec()))
        .mount(&internal_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "images": [STANDARD.encode(b"proxy-bytes")],
        })))
        .respond_with(streaming_response(&[
            json!({"response": "A camera view.", "done": true}),
        ]))
        .mount(&vision_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new(&vision_server.uri(), "moondream"))
            // Trailing slash on the internal base URL is tolerated.
            .with_internal_api(format!("{}/", internal_server.uri())),
    );

    let description = client
        .describe(
            &["/api/camera_proxy/camera.front".to_string()],
            "Describe.",
            &GenerationOverrides::new(),
        )
        .await
        .unwrap();
    assert_eq!(description, "A camera view.");
}

#[tokio::test]
async fn describe_tolerates_malformed_lines_in_the_stream() {
    let mock_server = MockServer::start().await;
    let media = media_dir_with(&[("front.jpg", b"jpeg-bytes")]);

    let body = format!(
        "{}\nNOT-JSON\n{}\n",
        json!({"response": "A", "done": false}),
        json!({"response": "B", "done": true}),
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new(&mock_server.uri(), "moondream"))
            .with_media_root(media.path()),
    );

    let description = client
        .describe(
            &["front.jpg".to_string()],
            "Describe.",
            &GenerationOverrides::new(),
        )
        .await
        .unwrap();
    assert_eq!(description, "AB");
}

#[tokio::test]
async fn per_call_override_wins_over_configured_options() {
    let mock_server = MockServer::start().await;
    let media = media_dir_with(&[("front.jpg", b"jpeg-bytes")]);

    // Instance configured with temperature 0.3; the call overrides to 1.5 and
    // leaves top_k alone, so top_k keeps the configured 10.
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "options": { "temperature": 1.5, "top_k": 10 }
        })))
        .respond_with(streaming_response(&[json!({"response": "ok", "done": true})]))
        .mount(&mock_server)
        .await;

    let configured = GenerationOptions::default()
        .merged(&GenerationOverrides::new().with_temperature(0.3).with_top_k(10));
    let client = OllamaVisionClient::new(
        ClientConfig::new(
            ModelConfig::new(&mock_server.uri(), "moondream").with_options(configured),
        )
        .with_media_root(media.path()),
    );

    let description = client
        .describe(
            &["front.jpg".to_string()],
            "Describe.",
            &GenerationOverrides::new().with_temperature(1.5),
        )
        .await
        .unwrap();
    assert_eq!(description, "ok");
}

#[tokio::test]
async fn elaborate_substitutes_description_into_template() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3.1",
            "prompt": "Introduce this guest: a tall stranger",
            "stream": true,
        })))
        .respond_with(streaming_response(&[
            json!({"response": "Behold, ", "done": false}),
            json!({"response": "a tall stranger!", "done": true}),
        ]))
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new("visionhost", "moondream"))
            .with_text(ModelConfig::new(&mock_server.uri(), "llama3.1")),
    );

    let message = client
        .elaborate(
            "a tall stranger",
            "Introduce this guest: {description}",
            &GenerationOverrides::new(),
        )
        .await;
    assert_eq!(message, "Behold, a tall stranger!");

    // The text request carries no images field at all.
    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert!(body.get("images").is_none());
}

#[tokio::test]
async fn elaborate_falls_back_to_source_text_on_non_200() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new("visionhost", "moondream"))
            .with_text(ModelConfig::new(&mock_server.uri(), "llama3.1")),
    );

    let message = client
        .elaborate(
            "a tall stranger",
            "Introduce: {description}",
            &GenerationOverrides::new(),
        )
        .await;
    assert_eq!(message, "a tall stranger");
}

#[tokio::test]
async fn elaborate_falls_back_to_source_text_on_empty_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(streaming_response(&[json!({"response": "", "done": true})]))
        .mount(&mock_server)
        .await;

    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new("visionhost", "moondream"))
            .with_text(ModelConfig::new(&mock_server.uri(), "llama3.1")),
    );

    let message = client
        .elaborate(
            "a tall stranger",
            "Introduce: {description}",
            &GenerationOverrides::new(),
        )
        .await;
    assert_eq!(message, "a tall stranger");
}

#[tokio::test]
async fn elaborate_falls_back_when_the_text_host_is_down() {
    // Unroutable endpoint: the connect fails, the description survives.
    let client = OllamaVisionClient::new(
        ClientConfig::new(ModelConfig::new("visionhost", "moondream"))
            .with_text(ModelConfig::new("127.0.0.1:1", "llama3.1")),
    );

    let message = client
        .elaborate(
            "a tall stranger",
            "Introduce: {description}",
            &GenerationOverrides::new(),
        )
        .await;
    assert_eq!(message, "a tall stranger");
}
