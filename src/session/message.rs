// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Conversation messages

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Error,
}

impl MessageRole {
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "você",
            MessageRole::Assistant => "sócrates",
            MessageRole::Error => "erro",
        }
    }
}

/// One turn in a conversation
///
/// Messages are immutable once appended to a session's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
    /// Decoded image bytes; only assistant turns carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::stamped(MessageRole::User, text.into(), None)
    }

    pub fn assistant(text: impl Into<String>, image: Option<Vec<u8>>) -> Self {
        Self::stamped(MessageRole::Assistant, text.into(), image)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::stamped(MessageRole::Error, text.into(), None)
    }

    fn stamped(role: MessageRole, text: String, image: Option<Vec<u8>>) -> Self {
        Self {
            role,
            text,
            image,
            created_at: Utc::now(),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Decode a base64 image payload as sent by the backend.
///
/// Accepts an optional `data:...;base64,` prefix. Returns `None` for empty or
/// undecodable payloads.
pub fn decode_image(payload: &str) -> Option<Vec<u8>> {
    let trimmed = payload.trim();
    let data = match trimmed.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => trimmed,
    };
    if data.is_empty() {
        return None;
    }
    match STANDARD.decode(data) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::warn!(target: "socrates.session", error = %err, "dropping undecodable image payload");
            None
        }
    }
}
