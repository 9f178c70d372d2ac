//! Integration tests for the intake REST API.
//!
//! Each test spins up an Axum server on a random port and drives it with
//! reqwest, exercising the real HTTP contract against a stub LLM.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use talent_scout::config::GenerationConfig;
use talent_scout::error::LlmError;
use talent_scout::intake::{GenerationGateway, IntakeRouteState, SessionManager, intake_routes};
use talent_scout::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub LLM provider for integration tests (no real API calls).
struct StubLlm {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = &request.messages[0].content;
        let content = if prompt.contains("interview questions") {
            "1. Stub question one\n2. Stub question two"
        } else {
            "Stub assignment."
        };
        Ok(CompletionResponse {
            content: content.to_string(),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }
}

/// Start an Axum server on a random port, return (base_url, llm).
async fn start_server() -> (String, Arc<StubLlm>) {
    let llm = Arc::new(StubLlm {
        calls: AtomicUsize::new(0),
    });
    let provider: Arc<dyn LlmProvider> = llm.clone();
    let gateway = Arc::new(GenerationGateway::new(provider, GenerationConfig::default()));
    let manager = Arc::new(SessionManager::new(gateway));
    let app = intake_routes(IntakeRouteState { manager });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), llm)
}

async fn create_session(client: &reqwest::Client, base: &str) -> String {
    let resp = client
        .post(format!("{base}/api/sessions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    body["session_id"].as_str().unwrap().to_string()
}

async fn answer(client: &reqwest::Client, base: &str, id: &str, answer: Value) -> (u16, Value) {
    let resp = client
        .post(format!("{base}/api/sessions/{id}/answer"))
        .json(&json!({ "answer": answer }))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let (base, _llm) = start_server().await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn new_session_starts_at_first_step() {
    timeout(TEST_TIMEOUT, async {
        let (base, _llm) = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &base).await;

        let view: Value = client
            .get(format!("{base}/api/sessions/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["phase"], "collecting");
        assert_eq!(view["step"], 0);
        assert_eq!(view["total_steps"], 8);
        assert_eq!(view["progress_percent"], 0);
        assert!(view["created_at"].is_string());
        assert!(view.get("closed_at").is_none());
        assert_eq!(view["current"]["key"], "name");
        assert_eq!(view["current"]["shape"], "free_text");
        assert_eq!(view["current"]["question"], "What is your full name?");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_intake_over_http() {
    timeout(TEST_TIMEOUT, async {
        let (base, llm) = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &base).await;

        for text in [
            "Jane Doe",
            "jane@x.com",
            "(555) 123-4567",
            "3",
            "Backend Engineer",
            "Remote",
            "Python, SQL",
        ] {
            let (status, body) = answer(&client, &base, &id, json!(text)).await;
            assert_eq!(status, 200, "{text}: {body}");
            assert_eq!(body["status"], "accepted");
        }

        let (_, body) = answer(&client, &base, &id, json!("ignored")).await;
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["session"]["current"]["shape"], "multi_select");
        assert_eq!(
            body["session"]["current"]["options"].as_array().unwrap().len(),
            7
        );

        let (status, body) =
            answer(&client, &base, &id, json!(["Backend Development"])).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "finished");

        let session = &body["session"];
        assert_eq!(session["phase"], "finished");
        assert_eq!(session["progress_percent"], 100);
        assert!(session.get("current").is_none());
        assert_eq!(session["tech_questions"].as_array().unwrap().len(), 4);
        assert_eq!(session["question_sets"][0]["tech"], "Python");
        assert_eq!(session["question_sets"][1]["tech"], "SQL");
        assert_eq!(session["assignments"][0]["category"], "Backend Development");
        assert_eq!(session["assignments"][0]["assignment"], "Stub assignment.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);

        // Re-rendering a finished session never regenerates.
        let view: Value = client
            .get(format!("{base}/api/sessions/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["phase"], "finished");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);

        let (status, body) = answer(&client, &base, &id, json!("more")).await;
        assert_eq!(status, 409);
        assert_eq!(body["session"]["phase"], "finished");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn validation_errors_are_unprocessable() {
    timeout(TEST_TIMEOUT, async {
        let (base, _llm) = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &base).await;

        answer(&client, &base, &id, json!("Jane")).await;
        let (status, body) = answer(&client, &base, &id, json!("jane-at-x")).await;
        assert_eq!(status, 422);
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["error"], "Please enter a valid email address.");
        assert_eq!(body["session"]["step"], 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn quit_ends_session() {
    timeout(TEST_TIMEOUT, async {
        let (base, llm) = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &base).await;

        answer(&client, &base, &id, json!("Jane")).await;
        let (status, body) = answer(&client, &base, &id, json!("quit")).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ended");
        assert_eq!(body["session"]["phase"], "ended");
        assert!(body["session"]["closed_at"].is_string());
        assert!(body["session"].get("current").is_none());
        assert!(
            body["session"]["message"]
                .as_str()
                .unwrap()
                .starts_with("Thank you for chatting with TalentScout!")
        );
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    timeout(TEST_TIMEOUT, async {
        let (base, _llm) = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("{base}/api/sessions/not-a-uuid"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let missing = uuid::Uuid::new_v4();
        let resp = client
            .get(format!("{base}/api/sessions/{missing}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let (status, _) = answer(&client, &base, &missing.to_string(), json!("x")).await;
        assert_eq!(status, 404);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn delete_removes_session() {
    timeout(TEST_TIMEOUT, async {
        let (base, _llm) = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &base).await;

        let resp = client
            .delete(format!("{base}/api/sessions/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let resp = client
            .get(format!("{base}/api/sessions/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    })
    .await
    .expect("test timed out");
}
