// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Wire types for the tutor backend's REST API

use serde::{Deserialize, Deserializer, Serialize};

use crate::provider::Provider;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Absent on the first turn; the backend then opens a new session
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_id: Option<String>,
}

/// Successful reply from `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Empty for image-only replies, which may send `null`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,
    /// Base64-encoded PNG
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub suggested_questions: Option<Vec<String>>,
    #[serde(default)]
    pub competency_assessment: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /api/validate-api` and `POST /api/api-config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfigPayload {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
}

/// Reply from `POST /api/validate-api`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReply {
    pub valid: bool,
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Reply from `/api/login` and `/api/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthReply {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Teacher,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Student => "Estudante",
            UserRole::Teacher => "Professor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Naive ISO timestamp as emitted by the backend
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub class_ids: Vec<String>,
}

/// A learning trail from `GET /api/trails`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trail {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
}

/// A class from `GET /api/classes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub join_code: String,
    #[serde(default)]
    pub student_ids: Vec<String>,
}
