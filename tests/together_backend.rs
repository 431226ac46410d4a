use axum::{ extract::State, http::{ HeaderMap, StatusCode }, routing::post, Json, Router };
use llm_chatbot::cache::ResponseCache;
use llm_chatbot::llm::completion::{ CompletionClient, CompletionResult, RetryPolicy, BUSY_MESSAGE };
use llm_chatbot::llm::together::{ CompletionBackend, TogetherClient };
use llm_chatbot::llm::{ LlmConfig, LlmError, ModelChoice };
use serde_json::{ json, Value };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<AtomicUsize>,
    fail_first: usize,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let n = state.calls.fetch_add(1, Ordering::SeqCst);
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
    state.seen.lock().unwrap().push((auth, body));

    if n < state.fail_first {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "busy" })));
    }
    (StatusCode::OK, Json(json!({ "choices": [{ "text": " Sure thing.\nUser: next?" }] })))
}

async fn spawn_mock(state: MockState) -> String {
    let app = Router::new().route("/v1/completions", post(completions)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1/completions", addr)
}

fn config_for(base_url: String) -> LlmConfig {
    LlmConfig {
        api_key: "test-key".to_string(),
        base_url,
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn sends_bearer_auth_and_documented_body() {
    let state = MockState::default();
    let url = spawn_mock(state.clone()).await;
    let backend = TogetherClient::new(&config_for(url)).unwrap();

    let request = backend.build_request(ModelChoice::Llama33Turbo, "hello".to_string());
    let resp = backend.send(&request).await.unwrap();
    assert_eq!(resp.first_text(), " Sure thing.\nUser: next?");

    let seen = state.seen.lock().unwrap();
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(body["model"], "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free");
    assert_eq!(body["prompt"], "hello");
    assert_eq!(body["max_rpm"], 60);
    assert_eq!(body["temperature"], 0.5);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let state = MockState { fail_first: 1, ..MockState::default() };
    let url = spawn_mock(state).await;
    let backend = TogetherClient::new(&config_for(url)).unwrap();

    let request = backend.build_request(ModelChoice::Qwen2Instruct, "x".to_string());
    match backend.send(&request).await {
        Err(LlmError::Status(code)) => assert_eq!(code, 503),
        other => panic!("expected status error, got {:?}", other.map(|r| r.choices.len())),
    }
}

#[tokio::test]
async fn client_retries_against_a_flaky_endpoint() {
    let state = MockState { fail_first: 2, ..MockState::default() };
    let url = spawn_mock(state.clone()).await;
    let backend = Arc::new(TogetherClient::new(&config_for(url)).unwrap());
    let retry = RetryPolicy { max_attempts: 3, delay: Duration::from_millis(10) };
    let client = CompletionClient::new(backend, retry, ResponseCache::default());

    let result = client.complete("help me", ModelChoice::default()).await;

    assert_eq!(result, CompletionResult::Text("Sure thing.".to_string()));
    assert_eq!(state.calls.load(Ordering::SeqCst), 3);
    let seen = state.seen.lock().unwrap();
    assert!(seen[0].1["prompt"].as_str().unwrap().ends_with("\nUser: help me\nAssistant:"));
}

#[tokio::test]
async fn unreachable_endpoint_reports_busy() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = Arc::new(TogetherClient::new(&config_for(format!("http://{}/v1/completions", addr))).unwrap());
    let retry = RetryPolicy { max_attempts: 2, delay: Duration::ZERO };
    let client = CompletionClient::new(backend, retry, ResponseCache::default());

    let result = client.complete("anyone?", ModelChoice::default()).await;
    assert_eq!(result, CompletionResult::Failure(BUSY_MESSAGE.to_string()));
}
