// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Tutor backend API
//!
//! [`TutorBackend`] is the seam the conversation and provider controllers
//! depend on. [`BackendClient`] implements it over HTTP; [`MockBackend`]
//! implements it in-process for tests.

use async_trait::async_trait;

use crate::error::Result;

pub mod client;
pub mod mock;
pub mod types;

pub use client::BackendClient;
pub use mock::{MockBackend, MockFailure};
pub use types::*;

/// The backend operations the controllers need
#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// Send one user turn and receive the tutor's reply.
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply>;

    /// Ask the backend to check a provider credential.
    async fn validate_api(&self, payload: ApiConfigPayload) -> Result<ValidationReply>;

    /// Persist a provider configuration for the current account.
    async fn save_api_config(&self, payload: ApiConfigPayload) -> Result<Ack>;
}
