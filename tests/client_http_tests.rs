// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use socrates::api::{ApiConfigPayload, BackendClient, ChatRequest, TutorBackend};
use socrates::auth::StaticToken;
use socrates::error::{ApiError, SocratesError};
use socrates::provider::{Provider, ProviderConfigGate, ValidationResult};
use socrates::session::{MessageRole, SessionController, APOLOGY_TEXT};

fn client(server: &MockServer, token: Option<&str>) -> BackendClient {
    let tokens = match token {
        Some(token) => StaticToken::new(token),
        None => StaticToken::none(),
    };
    BackendClient::new(server.uri(), Arc::new(tokens), Duration::from_millis(500)).unwrap()
}

fn payload() -> ApiConfigPayload {
    ApiConfigPayload {
        provider: Provider::OpenAi,
        api_key: "sk-test".to_string(),
        model: "gpt-4o-mini".to_string(),
    }
}

#[tokio::test]
async fn test_chat_sends_null_session_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({"message": "O que é filosofia?", "session_id": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Uma pergunta antiga.",
            "image": null,
            "session_id": "abc123",
            "suggested_questions": ["Fale sobre Platão"],
            "competency_assessment": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server, Some("tok-1"))
        .chat(ChatRequest {
            message: "O que é filosofia?".to_string(),
            session_id: None,
            trail_id: None,
        })
        .await
        .unwrap();

    assert_eq!(reply.response, "Uma pergunta antiga.");
    assert_eq!(reply.session_id.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_server_detail_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Error in chat: boom"})),
        )
        .mount(&server)
        .await;

    let err = client(&server, None)
        .chat(ChatRequest {
            message: "Oi".to_string(),
            session_id: None,
            trail_id: None,
        })
        .await
        .unwrap_err();

    match err {
        SocratesError::Api(ApiError::ServerError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Error in chat: boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "tarde demais"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client(&server, None)
        .chat(ChatRequest {
            message: "Oi".to_string(),
            session_id: None,
            trail_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SocratesError::Api(ApiError::Timeout)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = BackendClient::new(
        "http://127.0.0.1:1",
        Arc::new(StaticToken::none()),
        Duration::from_secs(1),
    )
    .unwrap();
    let err = client.validate_api(payload()).await.unwrap_err();
    match err {
        SocratesError::Api(api) => assert!(api.is_transport()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate-api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server, None).validate_api(payload()).await.unwrap_err();
    assert!(matches!(
        err,
        SocratesError::Api(ApiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_controller_over_http_degrades_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let backend: Arc<dyn TutorBackend> = Arc::new(client(&server, None));
    let controller = SessionController::new(backend);
    controller.submit("O que é o bem?").await;

    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, MessageRole::Error);
    assert_eq!(messages[1].text, APOLOGY_TEXT);
}

#[tokio::test]
async fn test_image_only_reply_becomes_assistant_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": null,
            "image": "iVBORw0KGgo=",
            "session_id": "img-1"
        })))
        .mount(&server)
        .await;

    let backend: Arc<dyn TutorBackend> = Arc::new(client(&server, None));
    let controller = SessionController::new(backend);
    controller.submit("Desenhe a caverna de Platão").await;

    let reply = controller.last_message().unwrap();
    assert_eq!(reply.role, MessageRole::Assistant);
    assert!(reply.text.is_empty());
    assert!(reply.has_image());
    assert_eq!(controller.session_id().as_deref(), Some("img-1"));
}

#[tokio::test]
async fn test_gate_validates_then_persists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate-api"))
        .and(body_json(json!({
            "provider": "openai",
            "api_key": "sk-test",
            "model": "gpt-4o-mini"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "models": ["gpt-4o-mini", "gpt-4o"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/api-config"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "API configuration saved successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend: Arc<dyn TutorBackend> = Arc::new(client(&server, Some("tok-2")));
    let gate = ProviderConfigGate::new(backend);
    gate.set_api_key("sk-test");
    gate.validate().await;

    assert_eq!(
        gate.validation_result(),
        Some(ValidationResult::Valid {
            models: vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()]
        })
    );
}

#[tokio::test]
async fn test_gate_rejection_skips_persist() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate-api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"valid": false, "error": "bad key"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/api-config"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend: Arc<dyn TutorBackend> = Arc::new(client(&server, None));
    let gate = ProviderConfigGate::new(backend);
    gate.set_api_key("sk-bad");
    gate.validate().await;

    assert_eq!(gate.validation_result().unwrap().error(), Some("bad key"));
}

#[tokio::test]
async fn test_save_rejection_surfaces_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/api-config"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let backend: Arc<dyn TutorBackend> = Arc::new(client(&server, None));
    let gate = ProviderConfigGate::new(backend);
    gate.set_api_key("sk");
    gate.validate().await;

    assert_eq!(
        gate.validation_result(),
        Some(ValidationResult::Failed {
            error: "Invalid token".to_string()
        })
    );
}

#[tokio::test]
async fn test_login_and_trails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"email": "m@example.com", "password": "segredo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-3",
            "token_type": "bearer",
            "user": {
                "id": "u1",
                "name": "Maria",
                "email": "m@example.com",
                "role": "student",
                "created_at": "2025-03-01T12:00:00.123456",
                "class_ids": []
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trails"))
        .and(header("authorization", "Bearer tok-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "Ética", "description": "Virtude e bem", "subject": "filosofia"}
        ])))
        .mount(&server)
        .await;

    let reply = client(&server, None)
        .login("m@example.com", "segredo")
        .await
        .unwrap();
    assert_eq!(reply.user.name, "Maria");

    let trails = client(&server, Some(&reply.access_token))
        .trails()
        .await
        .unwrap();
    assert_eq!(trails.len(), 1);
    assert_eq!(trails[0].title, "Ética");
}
