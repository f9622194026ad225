//! HttpBackend against a local axum server standing in for the backend

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
    routing::post,
};
use pdflingo::backend::{
    BackendApi, BackendError, EXTRACT_PATH, HttpBackend, TRANSLATE_PATH, TranslationRequest,
    extract,
};
use pdflingo::model::OcrText;
use pdflingo::session::{LoadedFile, SelectedFile};

#[derive(Debug, Clone)]
struct Upload {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Seen {
    uploads: Vec<Upload>,
    translations: Vec<(Option<String>, serde_json::Value)>,
}

type Reply = (StatusCode, [(HeaderName, &'static str); 1], String);

/// Answers every request with the same status and JSON body, and records
/// what it was sent
#[derive(Clone)]
struct MockBackend {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Seen>>,
}

impl MockBackend {
    fn replying(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            seen: Arc::default(),
        }
    }

    fn reply(&self) -> Reply {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body.clone(),
        )
    }

    fn uploads(&self) -> Vec<Upload> {
        self.seen.lock().unwrap().uploads.clone()
    }

    fn translations(&self) -> Vec<(Option<String>, serde_json::Value)> {
        self.seen.lock().unwrap().translations.clone()
    }
}

async fn extract_text(State(mock): State<MockBackend>, mut multipart: Multipart) -> Reply {
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        mock.seen.lock().unwrap().uploads.push(Upload {
            field: field_name,
            file_name,
            content_type,
            bytes,
        });
    }
    mock.reply()
}

async fn translate(
    State(mock): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Reply {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.seen
        .lock()
        .unwrap()
        .translations
        .push((content_type, body));
    mock.reply()
}

/// Serve `mock` on an ephemeral port from its own runtime thread
fn serve(mock: &MockBackend) -> HttpBackend {
    let app = Router::new()
        .route(EXTRACT_PATH, post(extract_text))
        .route(TRANSLATE_PATH, post(translate))
        .with_state(mock.clone());
    let (addr_tx, addr_rx) = flume::bounded(1);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            addr_tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    let addr = addr_rx.recv().unwrap();
    HttpBackend::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

fn loaded(name: &str, bytes: &[u8]) -> LoadedFile {
    LoadedFile {
        file: SelectedFile::from_path(format!("/tmp/{name}")),
        bytes: Arc::new(bytes.to_vec()),
    }
}

fn hello_request() -> TranslationRequest {
    TranslationRequest {
        text: "Hello".to_string(),
        model: "gpt-4o-mini".to_string(),
        target_language: "chinese".to_string(),
    }
}

#[test]
fn extraction_uploads_pdf_field_as_multipart() {
    let mock = MockBackend::replying(
        StatusCode::OK,
        r#"{"pages":[{"pdf_text":"Hello","image_ocr_text":["a","b"]},{"pdf_text":"","image_ocr_text":"x"}]}"#,
    );
    let backend = serve(&mock);

    let results = backend
        .extract_text(&loaded("paper.pdf", b"%PDF-1.4 body"))
        .unwrap();

    let uploads = mock.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field, "pdf");
    assert_eq!(uploads[0].file_name.as_deref(), Some("paper.pdf"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploads[0].bytes, b"%PDF-1.4 body");

    assert_eq!(results.len(), 2);
    assert_eq!(
        results.page(1).unwrap().image_ocr_text,
        OcrText::Many(vec!["a".into(), "b".into()])
    );
    assert_eq!(results.page(2).unwrap().body_text(), None);
}

#[test]
fn translation_posts_json_body() {
    let mock = MockBackend::replying(StatusCode::OK, r#"{"translated_text":"你好"}"#);
    let backend = serve(&mock);

    let translated = backend.translate(&hello_request()).unwrap();

    assert_eq!(translated, "你好");
    let translations = mock.translations();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[0].0.as_deref(), Some("application/json"));
    assert_eq!(
        translations[0].1,
        serde_json::json!({
            "text": "Hello",
            "model": "gpt-4o-mini",
            "target_language": "chinese"
        })
    );
}

#[test]
fn non_success_status_is_reported() {
    let mock = MockBackend::replying(StatusCode::SERVICE_UNAVAILABLE, r#"{"error":"busy"}"#);
    let backend = serve(&mock);

    let err = backend
        .extract_text(&loaded("paper.pdf", b"%PDF"))
        .unwrap_err();

    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("busy"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn long_error_body_is_cut_before_reaching_the_user() {
    let mock = MockBackend::replying(StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(5000));
    let backend = serve(&mock);

    let err = extract(&backend, &loaded("paper.pdf", b"%PDF")).unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Error extracting text: server returned 500"));
    assert!(message.ends_with('…'));
    assert!(message.chars().count() < 300, "{}", message.len());
}

#[test]
fn malformed_json_is_a_decode_error() {
    let mock = MockBackend::replying(StatusCode::OK, r#"{"pages":"#);
    let backend = serve(&mock);

    let err = backend
        .extract_text(&loaded("paper.pdf", b"%PDF"))
        .unwrap_err();

    assert!(matches!(err, BackendError::Decode(_)), "{err:?}");
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let backend =
        HttpBackend::new(format!("http://127.0.0.1:{port}"), Duration::from_secs(5)).unwrap();

    let err = backend.translate(&hello_request()).unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "{err:?}");
}
