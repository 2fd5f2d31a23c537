// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Provider configuration gate
//!
//! Holds the provider/key/model selection, validates it against the backend
//! and, when the backend accepts the credential, persists it to the account.
//! At most one validation runs at a time.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::JoinHandle;

use crate::api::types::ApiConfigPayload;
use crate::api::TutorBackend;
use crate::error::{Result, SocratesError};

use super::catalog::{default_model, default_models, Provider};

/// Error text used when the backend gave no detail
const GENERIC_VALIDATION_ERROR: &str = "Validation failed";

/// The selection being configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
}

impl GateConfig {
    fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            api_key: String::new(),
            model: default_model(provider).to_string(),
        }
    }

    fn payload(&self) -> ApiConfigPayload {
        ApiConfigPayload {
            provider: self.provider,
            api_key: self.api_key.clone(),
            model: self.model.clone(),
        }
    }
}

/// Verdict of the last finished validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Credential accepted and configuration saved
    Valid { models: Vec<String> },
    /// The provider rejected the credential or model
    Rejected { error: String },
    /// The validation or save request itself failed
    Failed { error: String },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid { .. } => None,
            ValidationResult::Rejected { error } | ValidationResult::Failed { error } => {
                Some(error)
            }
        }
    }
}

/// Why `validate` did not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateIgnored {
    MissingApiKey,
    AlreadyValidating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateOutcome {
    Finished(ValidationResult),
    Ignored(ValidateIgnored),
    /// The gate was dropped before the verdict arrived
    Detached,
}

#[derive(Debug)]
struct GateState {
    config: GateConfig,
    validating: bool,
    result: Option<ValidationResult>,
    /// Last non-empty model list advertised by a successful validation
    validated_models: Option<(Provider, Vec<String>)>,
}

impl GateState {
    fn model_options(&self) -> Vec<String> {
        match &self.validated_models {
            Some((provider, models)) if *provider == self.config.provider => models.clone(),
            _ => default_models(self.config.provider)
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

fn lock_state(state: &Mutex<GateState>) -> MutexGuard<'_, GateState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Provider gate lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Clears the validating flag if a validation is abandoned mid-flight.
struct ValidationInFlight {
    state: Weak<Mutex<GateState>>,
    armed: bool,
}

impl ValidationInFlight {
    fn disarm(mut self) -> Weak<Mutex<GateState>> {
        self.armed = false;
        self.state.clone()
    }
}

impl Drop for ValidationInFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(shared) = self.state.upgrade() {
            tracing::warn!(target: "socrates.provider", "validation abandoned before completion");
            let mut state = lock_state(&shared);
            state.validating = false;
            state.result = Some(ValidationResult::Failed {
                error: GENERIC_VALIDATION_ERROR.to_string(),
            });
        }
    }
}

/// Owns the provider selection and its validation lifecycle
pub struct ProviderConfigGate {
    backend: Arc<dyn TutorBackend>,
    state: Arc<Mutex<GateState>>,
}

impl ProviderConfigGate {
    /// Start at OpenAI with its default model and no key.
    pub fn new(backend: Arc<dyn TutorBackend>) -> Self {
        Self::with_provider(backend, Provider::default())
    }

    /// Start at `provider` with its default model and no key.
    pub fn with_provider(backend: Arc<dyn TutorBackend>, provider: Provider) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(GateState {
                config: GateConfig::for_provider(provider),
                validating: false,
                result: None,
                validated_models: None,
            })),
        }
    }

    /// Switch provider; the model resets to the provider's first static
    /// default, whatever was selected before.
    ///
    /// The API key is kept as entered. A remembered model list for
    /// `provider` that does not offer that default is forgotten, so the
    /// options fall back to the static list.
    pub fn set_provider(&self, provider: Provider) {
        let mut state = lock_state(&self.state);
        let model = default_model(provider).to_string();

        let stale = matches!(
            &state.validated_models,
            Some((remembered, models)) if *remembered == provider && !models.contains(&model)
        );
        if stale {
            tracing::debug!(target: "socrates.provider", provider = %provider, "dropping validated models without the default");
            state.validated_models = None;
        }

        state.config.provider = provider;
        state.config.model = model;
        tracing::debug!(target: "socrates.provider", provider = %provider, model = %state.config.model, "provider selected");
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) {
        lock_state(&self.state).config.api_key = api_key.into();
    }

    /// Pick a model from [`model_options`](Self::model_options).
    pub fn select_model(&self, model: &str) -> Result<()> {
        let mut state = lock_state(&self.state);
        if !state.model_options().iter().any(|m| m == model) {
            return Err(SocratesError::Provider(format!(
                "Model '{}' is not offered for {}",
                model, state.config.provider
            )));
        }
        state.config.model = model.to_string();
        Ok(())
    }

    /// Selectable models: the last validated list for the current provider
    /// when there is one, otherwise the static defaults.
    pub fn model_options(&self) -> Vec<String> {
        lock_state(&self.state).model_options()
    }

    pub fn config(&self) -> GateConfig {
        lock_state(&self.state).config.clone()
    }

    pub fn validation_result(&self) -> Option<ValidationResult> {
        lock_state(&self.state).result.clone()
    }

    pub fn is_validating(&self) -> bool {
        lock_state(&self.state).validating
    }

    /// Whether the validate affordance should be enabled.
    pub fn can_validate(&self) -> bool {
        let state = lock_state(&self.state);
        !state.validating && !state.config.api_key.trim().is_empty()
    }

    /// Validate the current selection and wait for the verdict.
    pub async fn validate(&self) -> ValidateOutcome {
        match self.begin() {
            Ok((flight, payload)) => {
                Self::complete(Arc::clone(&self.backend), flight, payload).await
            }
            Err(reason) => ValidateOutcome::Ignored(reason),
        }
    }

    /// Validate on a background task. Must be called within a tokio runtime.
    pub fn spawn_validate(
        &self,
    ) -> std::result::Result<JoinHandle<ValidateOutcome>, ValidateIgnored> {
        let (flight, payload) = self.begin()?;
        let backend = Arc::clone(&self.backend);
        Ok(tokio::spawn(Self::complete(backend, flight, payload)))
    }

    fn begin(
        &self,
    ) -> std::result::Result<(ValidationInFlight, ApiConfigPayload), ValidateIgnored> {
        let mut state = lock_state(&self.state);
        if state.config.api_key.trim().is_empty() {
            return Err(ValidateIgnored::MissingApiKey);
        }
        if state.validating {
            return Err(ValidateIgnored::AlreadyValidating);
        }

        state.validating = true;
        state.result = None;

        let payload = state.config.payload();
        tracing::info!(
            target: "socrates.provider",
            provider = %payload.provider,
            model = %payload.model,
            "validating provider credential"
        );

        let flight = ValidationInFlight {
            state: Arc::downgrade(&self.state),
            armed: true,
        };
        Ok((flight, payload))
    }

    async fn complete(
        backend: Arc<dyn TutorBackend>,
        flight: ValidationInFlight,
        payload: ApiConfigPayload,
    ) -> ValidateOutcome {
        let provider = payload.provider;
        let (advertised, verdict) = match backend.validate_api(payload.clone()).await {
            Ok(reply) if reply.valid => {
                let models = reply.models.unwrap_or_default();
                let verdict = match backend.save_api_config(payload).await {
                    Ok(_) => ValidationResult::Valid {
                        models: models.clone(),
                    },
                    Err(err) => {
                        tracing::warn!(target: "socrates.provider", error = %err, "saving provider configuration failed");
                        ValidationResult::Failed {
                            error: failure_text(&err),
                        }
                    }
                };
                (Some(models), verdict)
            }
            Ok(reply) => {
                let error = reply
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_VALIDATION_ERROR.to_string());
                tracing::info!(target: "socrates.provider", provider = %provider, "credential rejected");
                (None, ValidationResult::Rejected { error })
            }
            Err(err) => {
                tracing::warn!(target: "socrates.provider", error = %err, "validation request failed");
                (
                    None,
                    ValidationResult::Failed {
                        error: failure_text(&err),
                    },
                )
            }
        };

        let weak = flight.disarm();
        let Some(shared) = weak.upgrade() else {
            tracing::debug!(target: "socrates.provider", "gate dropped; discarding validation result");
            return ValidateOutcome::Detached;
        };
        let mut state = lock_state(&shared);

        // The selected model is what was just persisted; it is left alone
        // even when the advertised list does not name it.
        if let Some(models) = advertised.filter(|m| !m.is_empty()) {
            state.validated_models = Some((provider, models));
        }
        state.result = Some(verdict.clone());
        state.validating = false;

        ValidateOutcome::Finished(verdict)
    }
}

fn failure_text(err: &SocratesError) -> String {
    match err {
        SocratesError::Api(api) => api
            .user_detail()
            .unwrap_or(GENERIC_VALIDATION_ERROR)
            .to_string(),
        _ => GENERIC_VALIDATION_ERROR.to_string(),
    }
}
