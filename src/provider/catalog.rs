// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Static provider catalog
//!
//! The backend resolves credentials per account; the client only needs to
//! know which providers exist and which models each one offers before a
//! credential has been validated.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SocratesError;

/// An LLM provider the backend can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
}

const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o", "gpt-4.1", "gpt-4.1-mini"];
const ANTHROPIC_MODELS: &[&str] = &["claude-3-5-sonnet-20241022", "claude-3-5-haiku-20241022"];
const GEMINI_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-pro", "gemini-1.5-flash"];

impl Provider {
    /// All providers, in display order.
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Gemini];

    /// Wire name used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic (Claude)",
            Provider::Gemini => "Google Gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = SocratesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "gemini" => Ok(Provider::Gemini),
            other => Err(SocratesError::Provider(format!("Unknown provider: {}", other))),
        }
    }
}

/// Models offered for a provider before any validation has happened.
pub fn default_models(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::OpenAi => OPENAI_MODELS,
        Provider::Anthropic => ANTHROPIC_MODELS,
        Provider::Gemini => GEMINI_MODELS,
    }
}

/// First entry of the static list; every list is non-empty.
pub fn default_model(provider: Provider) -> &'static str {
    default_models(provider)[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_str() {
        for provider in Provider::ALL {
            let parsed: Provider = provider.as_str().parse().unwrap();
            assert_eq!(parsed, provider);
        }
    }

    #[test]
    fn test_provider_from_str_is_case_insensitive() {
        assert_eq!("Anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!(" GEMINI ".parse::<Provider>().unwrap(), Provider::Gemini);
    }

    #[test]
    fn test_provider_from_str_unknown() {
        let err = "mistral".parse::<Provider>().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn test_provider_serde_names() {
        let json = serde_json::to_string(&Provider::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let provider: Provider = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(provider, Provider::Gemini);
    }

    #[test]
    fn test_default_models_are_non_empty() {
        for provider in Provider::ALL {
            assert!(!default_models(provider).is_empty());
        }
    }

    #[test]
    fn test_default_model_per_provider() {
        assert_eq!(default_model(Provider::OpenAi), "gpt-4o-mini");
        assert_eq!(
            default_model(Provider::Anthropic),
            "claude-3-5-sonnet-20241022"
        );
        assert_eq!(default_model(Provider::Gemini), "gemini-2.0-flash");
    }

    #[test]
    fn test_value_enum_name_for_openai() {
        let value = Provider::OpenAi.to_possible_value().unwrap();
        assert_eq!(value.get_name(), "openai");
    }
}
