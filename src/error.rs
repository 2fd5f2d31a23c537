// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Error types for Socrates
//!
//! This module defines all error types used throughout the client.

use thiserror::Error;

/// Main error type for Socrates operations
#[derive(Error, Debug)]
pub enum SocratesError {
    /// Backend API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or rejected bearer token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Unknown provider or a model outside the advertised set
    #[error("Provider error: {0}")]
    Provider(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised at the HTTP boundary with the tutor backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// No response reached us (DNS, refused connection, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,

    /// The backend answered with 401
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// 2xx response whose body could not be decoded
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// True when the request never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    /// Short label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        if self.is_transport() {
            "transport"
        } else {
            "server"
        }
    }

    /// Text suitable for showing verbatim in the configuration view.
    ///
    /// Backend-provided detail wins; transport failures have none.
    pub fn user_detail(&self) -> Option<&str> {
        match self {
            ApiError::ServerError { message, .. } | ApiError::Unauthorized(message)
                if !message.trim().is_empty() =>
            {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Result type alias for Socrates operations
pub type Result<T> = std::result::Result<T, SocratesError>;
