use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use xhs_tools::error::{ApiError, AppError, AppResult, ErrorKind, InputError};
use xhs_tools::{OutputMode, SearchApp, SearchBackend, SearchKind, SearchRequest};

/// 返回固定响应的搜索后端
struct MockBackend {
    /// `Err` 为 (状态码, 原因)
    response: Result<Value, (u16, String)>,
    calls: Arc<AtomicUsize>,
    last_key: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    fn ok(response: Value) -> Self {
        Self {
            response: Ok(response),
            calls: Arc::new(AtomicUsize::new(0)),
            last_key: Arc::new(Mutex::new(None)),
        }
    }

    fn bad_status(status: u16, reason: &str) -> Self {
        Self {
            response: Err((status, reason.to_string())),
            ..Self::ok(Value::Null)
        }
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(&self, api_key: &str, _request: &SearchRequest) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_key.lock().unwrap() = Some(api_key.to_string());
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err((status, reason)) => Err(ApiError::BadStatus {
                status: *status,
                reason: reason.clone(),
            }
            .into()),
        }
    }
}

#[tokio::test]
async fn test_missing_api_key_makes_no_request() {
    let backend = MockBackend::ok(json!({}));
    let calls = Arc::clone(&backend.calls);
    let app = SearchApp::new(backend, None);

    let err = app
        .run(&SearchRequest::new("rust", SearchKind::Search), OutputMode::Text)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Input(InputError::MissingApiKey { .. })));
    assert_eq!(err.to_string(), "SERPER_API_KEY environment variable is not set.");
    assert_eq!(err.kind(), ErrorKind::UserInput);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let backend = MockBackend::ok(json!({}));
    let calls = Arc::clone(&backend.calls);
    let app = SearchApp::new(backend, Some("key".to_string()));

    let err = app
        .run(&SearchRequest::new("  ", SearchKind::Search), OutputMode::Text)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Input(InputError::MissingQuery)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_text_output_keeps_upstream_order() {
    let backend = MockBackend::ok(json!({
        "organic": [
            { "title": "Second by rank", "link": "https://b", "snippet": "b" },
            { "title": "First by rank", "link": "https://a" }
        ]
    }));
    let calls = Arc::clone(&backend.calls);
    let last_key = Arc::clone(&backend.last_key);
    let app = SearchApp::new(backend, Some("key".to_string()));

    let output = app
        .run(&SearchRequest::new("rust", SearchKind::Search), OutputMode::Text)
        .await
        .unwrap();

    assert!(output.starts_with("\n2 results:\n\n1. Second by rank\n"));
    assert!(output.contains("2. First by rank\n   https://a\n\n"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(last_key.lock().unwrap().as_deref(), Some("key"));
}

#[tokio::test]
async fn test_null_results_render_as_no_results() {
    let backend = MockBackend::ok(json!({ "organic": null, "images": null }));
    let app = SearchApp::new(backend, Some("key".to_string()));

    let output = app
        .run(&SearchRequest::new("rust", SearchKind::Search), OutputMode::Text)
        .await
        .unwrap();

    assert_eq!(output, "No results found.\n");
}

#[tokio::test]
async fn test_json_output_is_pretty_printed_passthrough() {
    let raw = json!({ "searchParameters": { "q": "rust" }, "news": [] });
    let app = SearchApp::new(MockBackend::ok(raw.clone()), Some("key".to_string()));

    let output = app
        .run(&SearchRequest::new("rust", SearchKind::News), OutputMode::Json)
        .await
        .unwrap();

    assert_eq!(output, serde_json::to_string_pretty(&raw).unwrap() + "\n");
}

#[tokio::test]
async fn test_bad_status_is_operation_error() {
    let backend = MockBackend::bad_status(401, "Unauthorized");
    let calls = Arc::clone(&backend.calls);
    let app = SearchApp::new(backend, Some("wrong".to_string()));

    let err = app
        .run(&SearchRequest::new("rust", SearchKind::Videos), OutputMode::Text)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Operation);
    assert_eq!(err.to_string(), "API error: 401 Unauthorized");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
