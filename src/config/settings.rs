// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Settings management for Socrates
//!
//! Handles loading and saving settings from ~/.socrates/settings.json

use serde::{Deserialize, Serialize};

mod io;
mod merge;
mod validation;

/// Main settings structure, stored in ~/.socrates/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Tutor backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Defaults for new sessions
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Bearer token lookup
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Tutor backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, without the `/api` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable that overrides `base_url`
    #[serde(default = "default_base_url_env")]
    pub base_url_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_url_env: default_base_url_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default settings for new sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Provider preselected by `socrates configure`
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Print the time next to each message
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            show_timestamps: true,
        }
    }
}

/// Bearer token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable that overrides the stored token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_base_url_env() -> String {
    "SOCRATES_BACKEND_URL".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_token_env() -> String {
    "SOCRATES_TOKEN".to_string()
}

fn default_true() -> bool {
    true
}
