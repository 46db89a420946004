use super::*;
use std::{io::Write as _, sync::Arc};

use axum::{
    extract::{Multipart, State},
    http::StatusCode as HttpStatus,
    routing::{get, post},
    Json, Router,
};
use shared::protocol::extract_and_format_route;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct RecordedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Clone)]
struct ServerState {
    fields: Arc<Mutex<Vec<RecordedField>>>,
    requests: Arc<Mutex<u32>>,
    reply_status: HttpStatus,
    reply_body: String,
}

async fn record_submission(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> (HttpStatus, String) {
    *state.requests.lock().await += 1;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.fields.lock().await.push(RecordedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    (state.reply_status, state.reply_body.clone())
}

async fn report_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_string(),
    })
}

async fn spawn_ocr_server(status: HttpStatus, body: &str) -> Result<(Url, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState {
        fields: Arc::new(Mutex::new(Vec::new())),
        requests: Arc::new(Mutex::new(0)),
        reply_status: status,
        reply_body: body.to_string(),
    };
    let app = Router::new()
        .route(extract_and_format_route(), post(record_submission))
        .route(health_route(), get(report_health))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let endpoint = Url::parse(&format!("http://{addr}{}", extract_and_format_route()))?;
    Ok((endpoint, state))
}

fn receipt_png() -> SelectedFile {
    SelectedFile::new("receipt.png", "image/png", b"\x89PNG\r\n\x1a\nfake".to_vec())
}

#[tokio::test]
async fn text_submission_sends_only_text_field() {
    let (endpoint, state) = spawn_ocr_server(HttpStatus::OK, r#"{"a":1}"#)
        .await
        .expect("spawn server");
    let client = OcrClient::new(endpoint);

    let body = client
        .submit(Submission::Text("CARD 4.50 COFFEE".to_string()))
        .await
        .expect("submit");

    assert_eq!(body, serde_json::json!({ "a": 1 }));
    let fields = state.fields.lock().await;
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, TEXT_FIELD);
    assert_eq!(fields[0].file_name, None);
    assert_eq!(fields[0].data, b"CARD 4.50 COFFEE");
}

#[tokio::test]
async fn image_submission_sends_file_part_with_metadata() {
    let (endpoint, state) = spawn_ocr_server(HttpStatus::OK, r#"{"status":"success"}"#)
        .await
        .expect("spawn server");
    let client = OcrClient::new(endpoint);

    client
        .submit(Submission::Image(receipt_png()))
        .await
        .expect("submit");

    let fields = state.fields.lock().await;
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, IMAGE_FIELD);
    assert_eq!(fields[0].file_name.as_deref(), Some("receipt.png"));
    assert_eq!(fields[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(fields[0].data, receipt_png().bytes);
}

#[tokio::test]
async fn form_with_file_and_text_sends_only_the_file() {
    let (endpoint, state) = spawn_ocr_server(HttpStatus::OK, r#"{"a":1}"#)
        .await
        .expect("spawn server");
    let client = OcrClient::new(endpoint);
    let mut form = FormController::new();
    form.select_file(Some(receipt_png()));
    form.edit_text("also some text");

    form.submit(&client).await;

    let fields = state.fields.lock().await;
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, IMAGE_FIELD);
    assert_eq!(form.response(), Some("{\n  \"a\": 1\n}"));
}

#[tokio::test]
async fn success_body_keeps_key_order_when_rendered() {
    let (endpoint, _state) = spawn_ocr_server(
        HttpStatus::OK,
        r#"{"status":"success","ocr_text":"TOTAL 12.00","formatted_data":{"transactions":[]}}"#,
    )
    .await
    .expect("spawn server");
    let client = OcrClient::new(endpoint);
    let mut form = FormController::new();
    form.edit_text("TOTAL 12.00");

    form.submit(&client).await;

    assert_eq!(
        form.response(),
        Some(
            "{\n  \"status\": \"success\",\n  \"ocr_text\": \"TOTAL 12.00\",\n  \"formatted_data\": {\n    \"transactions\": []\n  }\n}"
        )
    );
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn rejected_submit_surfaces_server_error_message() {
    let (endpoint, _state) = spawn_ocr_server(
        HttpStatus::BAD_REQUEST,
        r#"{"error":"bad image","details":"cannot identify image file"}"#,
    )
    .await
    .expect("spawn server");
    let client = OcrClient::new(endpoint);

    let err = client
        .submit(Submission::Image(receipt_png()))
        .await
        .expect_err("should be rejected");

    match &err {
        SubmitError::Rejected {
            status,
            message,
            details,
        } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(message.as_deref(), Some("bad image"));
            assert_eq!(details.as_deref(), Some("cannot identify image file"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "bad image");
}

#[tokio::test]
async fn rejected_submit_without_error_body_uses_generic_message() {
    let (endpoint, _state) =
        spawn_ocr_server(HttpStatus::INTERNAL_SERVER_ERROR, "Internal Server Error")
            .await
            .expect("spawn server");
    let client = OcrClient::new(endpoint);
    let mut form = FormController::new();
    form.edit_text("something");

    form.submit(&client).await;

    assert_eq!(form.error(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(form.response(), None);
}

#[tokio::test]
async fn unreachable_service_uses_generic_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = OcrClient::new(
        Url::parse(&format!("http://{addr}{}", extract_and_format_route())).expect("url"),
    );
    let err = client
        .submit(Submission::Text("x".to_string()))
        .await
        .expect_err("nothing is listening");

    assert!(matches!(err, SubmitError::Transport(_)));
    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn non_json_success_body_renders_as_json_string() {
    let (endpoint, _state) = spawn_ocr_server(HttpStatus::OK, "plain ok")
        .await
        .expect("spawn server");
    let client = OcrClient::new(endpoint);

    let body = client
        .submit(Submission::Text("x".to_string()))
        .await
        .expect("submit");

    assert_eq!(pretty_print(&body), "\"plain ok\"");
}

#[tokio::test]
async fn health_uses_endpoint_origin() {
    let (endpoint, state) = spawn_ocr_server(HttpStatus::OK, "{}")
        .await
        .expect("spawn server");
    let client = OcrClient::new(endpoint.clone());

    assert_eq!(client.health_url().path(), "/health");
    assert_eq!(client.health_url().port(), endpoint.port());

    let health = client.health().await.expect("health");
    assert_eq!(health.status, "running");
    assert_eq!(*state.requests.lock().await, 0);
}

#[test]
fn submission_prefers_file_over_text() {
    let file = receipt_png();
    assert_eq!(
        Submission::from_inputs(Some(&file), "text too"),
        Some(Submission::Image(file.clone()))
    );
    assert_eq!(
        Submission::from_inputs(None, "only text"),
        Some(Submission::Text("only text".to_string()))
    );
    assert_eq!(Submission::from_inputs(None, ""), None);
}

#[test]
fn whitespace_text_is_still_submitted() {
    assert_eq!(
        Submission::from_inputs(None, "   "),
        Some(Submission::Text("   ".to_string()))
    );
}

#[test]
fn load_reads_image_and_guesses_mime() {
    let dir = std::env::temp_dir().join(format!("recurapide_load_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("receipt.jpg");
    std::fs::File::create(&path)
        .and_then(|mut f| f.write_all(b"jpeg-bytes"))
        .expect("write image");

    let file = SelectedFile::load(&path).expect("load");
    assert_eq!(file.filename, "receipt.jpg");
    assert_eq!(file.mime_type, "image/jpeg");
    assert_eq!(file.bytes, b"jpeg-bytes");

    let not_image = dir.join("notes.txt");
    std::fs::write(&not_image, "hello").expect("write text");
    assert!(SelectedFile::load(&not_image).is_err());

    std::fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn decode_success_body_parses_json() {
    assert_eq!(decode_success_body(br#"[1,2]"#), serde_json::json!([1, 2]));
    assert_eq!(decode_success_body(b""), Value::String(String::new()));
}
