// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! HTTP client for the tutor backend
//!
//! JSON over HTTP(S) against the `/api/...` routes. Every request carries the
//! bearer token from the injected [`TokenSource`] when one is available.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::types::{
    Ack, ApiConfigPayload, AuthReply, ChatReply, ChatRequest, Class, LoginRequest,
    RegisterRequest, Trail, User, ValidationReply,
};
use crate::api::TutorBackend;
use crate::auth::TokenSource;
use crate::config::Settings;
use crate::error::{ApiError, Result, SocratesError};

/// Tutor backend over HTTP
pub struct BackendClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl BackendClient {
    /// Create a client for `base_url` (without the `/api` suffix).
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Create a client from user settings.
    pub fn from_settings(settings: &Settings, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        Self::new(settings.backend_url(), tokens, settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthReply> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_json(Method::POST, "/api/login", Some(&body)).await
    }

    /// `POST /api/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthReply> {
        self.send_json(Method::POST, "/api/register", Some(request))
            .await
    }

    /// `GET /api/me`
    pub async fn me(&self) -> Result<User> {
        self.require_token()?;
        self.send_json::<(), _>(Method::GET, "/api/me", None).await
    }

    /// `GET /api/trails`
    pub async fn trails(&self) -> Result<Vec<Trail>> {
        self.require_token()?;
        self.send_json::<(), _>(Method::GET, "/api/trails", None)
            .await
    }

    /// `GET /api/classes`
    pub async fn classes(&self) -> Result<Vec<Class>> {
        self.require_token()?;
        self.send_json::<(), _>(Method::GET, "/api/classes", None)
            .await
    }

    fn require_token(&self) -> Result<()> {
        if self.tokens.bearer_token().is_none() {
            return Err(SocratesError::Auth(
                "Not logged in. Run 'socrates login' first.".to_string(),
            ));
        }
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.tokens.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        tracing::debug!(
            target: "socrates.api",
            method = %method,
            path,
            status = status.as_u16(),
            "backend request finished"
        );

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &text).into());
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)).into())
    }
}

#[async_trait]
impl TutorBackend for BackendClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        self.send_json(Method::POST, "/api/chat", Some(&request))
            .await
    }

    async fn validate_api(&self, payload: ApiConfigPayload) -> Result<ValidationReply> {
        self.send_json(Method::POST, "/api/validate-api", Some(&payload))
            .await
    }

    async fn save_api_config(&self, payload: ApiConfigPayload) -> Result<Ack> {
        self.send_json(Method::POST, "/api/api-config", Some(&payload))
            .await
    }
}

/// Map a reqwest failure that produced no usable response.
fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Parse an error response
///
/// The backend reports failures as `{"detail": "..."}`; request validation
/// failures carry a list under `detail` instead of a string.
fn parse_error(status: u16, body: &str) -> ApiError {
    let message = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    };

    if status == 401 {
        ApiError::Unauthorized(message)
    } else {
        ApiError::ServerError { status, message }
    }
}
