use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use tagvi::web_server::{build_router, ClientMessage, ServerEvent};
use tagvi::{GenerateError, Role, TextGenerator};

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok("canned".to_string())
    }
}

#[tokio::test]
async fn index_serves_the_chat_page() {
    let app = build_router(Arc::new(CannedGenerator));
    let server = TestServer::new(app).unwrap();

    let response = server.get("/").await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("Tag-VI"));
    assert!(body.contains("chat-form"));
    assert!(body.contains("/static/app.js"));
}

#[test]
fn client_chat_message_parses() {
    let msg: ClientMessage = serde_json::from_str(r#"{"type":"chat","text":"Hello"}"#).unwrap();
    let ClientMessage::Chat { text } = msg;
    assert_eq!(text, "Hello");
}

#[test]
fn server_turn_event_serializes_role_tagged() {
    let event = ServerEvent::Turn {
        role: Role::Assistant,
        content: "Hi".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        serde_json::json!({"type": "turn", "role": "assistant", "content": "Hi"})
    );
}

#[test]
fn server_error_event_carries_the_message() {
    let event = ServerEvent::Error {
        message: "network error: connection refused".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        serde_json::json!({"type": "error", "message": "network error: connection refused"})
    );
}
