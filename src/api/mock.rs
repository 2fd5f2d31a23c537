// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Mock tutor backend for testing
//!
//! Provides a scriptable implementation of [`TutorBackend`] that can be used
//! in unit tests without a running server. Replies are queued per endpoint
//! and returned in order; when a queue is empty a sensible default is used.
//! Requests can optionally be held in flight until the test releases them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::api::types::{Ack, ApiConfigPayload, ChatReply, ChatRequest, ValidationReply};
use crate::api::TutorBackend;
use crate::error::{ApiError, Result};
use crate::provider::default_models;

/// Session id returned by default chat replies
pub const MOCK_SESSION_ID: &str = "mock-session";

/// A scripted failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Request timed out
    Timeout,
    /// Connection failed before any response
    Network(String),
    /// Backend answered with a non-2xx status
    Server { status: u16, detail: String },
}

impl MockFailure {
    fn to_error(&self) -> ApiError {
        match self {
            MockFailure::Timeout => ApiError::Timeout,
            MockFailure::Network(msg) => ApiError::Network(msg.clone()),
            MockFailure::Server { status, detail } => ApiError::ServerError {
                status: *status,
                message: detail.clone(),
            },
        }
    }
}

type Scripted<T> = std::result::Result<T, MockFailure>;

#[derive(Default)]
struct MockState {
    chat_replies: VecDeque<Scripted<ChatReply>>,
    validation_replies: VecDeque<Scripted<ValidationReply>>,
    save_replies: VecDeque<Scripted<Ack>>,
    chat_requests: Vec<ChatRequest>,
    validate_requests: Vec<ApiConfigPayload>,
    save_requests: Vec<ApiConfigPayload>,
}

/// A mock tutor backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    /// When set, every request waits for a permit before answering
    gate: Option<Arc<Semaphore>>,
}

impl MockBackend {
    /// Create a new mock backend that answers immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose requests stay in flight until [`release`](Self::release)
    pub fn held() -> Self {
        Self {
            state: Arc::default(),
            gate: Some(Arc::new(Semaphore::new(0))),
        }
    }

    /// Let `n` held requests proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Queue a successful chat reply
    pub fn with_chat_reply(self, reply: ChatReply) -> Self {
        self.lock().chat_replies.push_back(Ok(reply));
        self
    }

    /// Queue a plain-text chat reply with no session id or suggestions
    pub fn with_chat_text(self, text: impl Into<String>) -> Self {
        self.with_chat_reply(ChatReply {
            response: text.into(),
            ..Default::default()
        })
    }

    /// Queue a failed chat request
    pub fn with_chat_failure(self, failure: MockFailure) -> Self {
        self.lock().chat_replies.push_back(Err(failure));
        self
    }

    /// Queue a validation verdict
    pub fn with_validation(self, reply: ValidationReply) -> Self {
        self.lock().validation_replies.push_back(Ok(reply));
        self
    }

    /// Queue a failed validation request
    pub fn with_validation_failure(self, failure: MockFailure) -> Self {
        self.lock().validation_replies.push_back(Err(failure));
        self
    }

    /// Queue a failed persist request
    pub fn with_save_failure(self, failure: MockFailure) -> Self {
        self.lock().save_replies.push_back(Err(failure));
        self
    }

    /// Chat requests received so far, in order
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.lock().chat_requests.clone()
    }

    /// Validation requests received so far
    pub fn validate_requests(&self) -> Vec<ApiConfigPayload> {
        self.lock().validate_requests.clone()
    }

    /// Persist requests received so far
    pub fn save_requests(&self) -> Vec<ApiConfigPayload> {
        self.lock().save_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Mock backend state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    async fn wait_for_release(&self) {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl TutorBackend for MockBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let scripted = {
            let mut state = self.lock();
            state.chat_requests.push(request.clone());
            state.chat_replies.pop_front()
        };
        self.wait_for_release().await;

        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(failure)) => Err(failure.to_error().into()),
            None => Ok(ChatReply {
                response: format!("Resposta para: {}", request.message),
                session_id: Some(MOCK_SESSION_ID.to_string()),
                ..Default::default()
            }),
        }
    }

    async fn validate_api(&self, payload: ApiConfigPayload) -> Result<ValidationReply> {
        let scripted = {
            let mut state = self.lock();
            state.validate_requests.push(payload.clone());
            state.validation_replies.pop_front()
        };
        self.wait_for_release().await;

        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(failure)) => Err(failure.to_error().into()),
            None => Ok(ValidationReply {
                valid: true,
                models: Some(
                    default_models(payload.provider)
                        .iter()
                        .map(|m| m.to_string())
                        .collect(),
                ),
                error: None,
            }),
        }
    }

    async fn save_api_config(&self, payload: ApiConfigPayload) -> Result<Ack> {
        let scripted = {
            let mut state = self.lock();
            state.save_requests.push(payload);
            state.save_replies.pop_front()
        };

        match scripted {
            Some(Ok(ack)) => Ok(ack),
            Some(Err(failure)) => Err(failure.to_error().into()),
            None => Ok(Ack {
                message: Some("API configuration saved".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SocratesError;
    use crate::provider::Provider;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            message: text.to_string(),
            session_id: None,
            trail_id: None,
        }
    }

    #[tokio::test]
    async fn test_default_chat_reply_echoes_message() {
        let backend = MockBackend::new();
        let reply = backend.chat(request("Oi")).await.unwrap();
        assert_eq!(reply.response, "Resposta para: Oi");
        assert_eq!(reply.session_id.as_deref(), Some(MOCK_SESSION_ID));
        assert_eq!(backend.chat_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_queued_replies_in_order() {
        let backend = MockBackend::new()
            .with_chat_text("first")
            .with_chat_failure(MockFailure::Timeout);

        assert_eq!(backend.chat(request("a")).await.unwrap().response, "first");
        let err = backend.chat(request("b")).await.unwrap_err();
        assert!(matches!(err, SocratesError::Api(ApiError::Timeout)));
    }

    #[tokio::test]
    async fn test_default_validation_lists_static_models() {
        let backend = MockBackend::new();
        let reply = backend
            .validate_api(ApiConfigPayload {
                provider: Provider::Gemini,
                api_key: "key".to_string(),
                model: "gemini-2.0-flash".to_string(),
            })
            .await
            .unwrap();
        assert!(reply.valid);
        assert_eq!(reply.models.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_held_request_waits_for_release() {
        let backend = MockBackend::held();
        let task = {
            let backend = backend.clone();
            tokio::spawn(async move { backend.chat(request("wait")).await })
        };

        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        backend.release(1);
        let reply = task.await.unwrap().unwrap();
        assert_eq!(reply.response, "Resposta para: wait");
    }
}
