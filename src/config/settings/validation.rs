// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

use std::time::Duration;

use crate::error::{Result, SocratesError};
use crate::provider::Provider;

use super::Settings;

impl Settings {
    /// Get the backend base URL, checking env var first.
    pub fn backend_url(&self) -> String {
        // Priority: env var > config file.
        std::env::var(&self.backend.base_url_env)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.backend.base_url.clone())
            .trim_end_matches('/')
            .to_string()
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Provider preselected for configuration.
    pub fn default_provider(&self) -> Result<Provider> {
        self.defaults.provider.parse()
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let url = self.backend_url();
        if url.is_empty() {
            return Err(SocratesError::Config("Backend URL is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SocratesError::Config(format!(
                "Backend URL must start with http:// or https://, got '{}'",
                url
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(SocratesError::Config(
                "Request timeout must be at least one second".to_string(),
            ));
        }
        self.default_provider()
            .map_err(|e| SocratesError::Config(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_isolated_env(var: &str) -> Settings {
        let mut settings = Settings::default();
        settings.backend.base_url_env = var.to_string();
        std::env::remove_var(var);
        settings
    }

    #[test]
    fn test_default_settings_validate() {
        let settings = settings_with_isolated_env("SOCRATES_TEST_URL_DEFAULT_1");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_backend_url_trims_trailing_slash() {
        let mut settings = settings_with_isolated_env("SOCRATES_TEST_URL_SLASH_2");
        settings.backend.base_url = "https://tutor.example/".to_string();
        assert_eq!(settings.backend_url(), "https://tutor.example");
    }

    #[test]
    fn test_backend_url_env_priority() {
        let var = "SOCRATES_TEST_URL_PRIORITY_3";
        let mut settings = settings_with_isolated_env(var);
        settings.backend.base_url = "http://from-file:8001".to_string();
        assert_eq!(settings.backend_url(), "http://from-file:8001");

        std::env::set_var(var, "https://from-env");
        assert_eq!(settings.backend_url(), "https://from-env");

        std::env::remove_var(var);
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut settings = settings_with_isolated_env("SOCRATES_TEST_URL_SCHEME_4");
        settings.backend.base_url = "ftp://tutor".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut settings = settings_with_isolated_env("SOCRATES_TEST_URL_TIMEOUT_5");
        settings.backend.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut settings = settings_with_isolated_env("SOCRATES_TEST_URL_PROVIDER_6");
        settings.defaults.provider = "mistral".to_string();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SocratesError::Config(_)));
    }

    #[test]
    fn test_request_timeout() {
        let mut settings = Settings::default();
        settings.backend.timeout_secs = 5;
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }
}
