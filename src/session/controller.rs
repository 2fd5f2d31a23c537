// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Session controller
//!
//! Owns the message log, the backend session id, the current follow-up
//! suggestions and the Idle/Pending phase. One submission runs at a time:
//!
//! 1. the user turn is appended immediately and is never retracted,
//! 2. the phase moves to Pending and the chat request is issued,
//! 3. the reply (or an apology, on failure) is appended,
//! 4. the phase returns to Idle.
//!
//! The network half only holds a weak reference to the controller state, so
//! a reply that arrives after the controller was dropped is discarded.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::JoinHandle;

use crate::api::types::{ChatReply, ChatRequest};
use crate::api::TutorBackend;
use crate::error::{Result, SocratesError};

use super::message::{decode_image, Message};

/// Shown in place of a reply whenever a chat request fails
pub const APOLOGY_TEXT: &str = "Desculpe, ocorreu um erro. Tente novamente.";

/// Prompts offered before the first turn of a conversation
pub const STARTER_QUESTIONS: [&str; 4] = [
    "O que é filosofia?",
    "Fale sobre Platão",
    "O que é o bem?",
    "Explique a ética",
];

/// Request lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerPhase {
    #[default]
    Idle,
    Pending,
}

/// Why a submission was dropped without touching the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitIgnored {
    /// The text was empty after trimming
    EmptyInput,
    /// Another submission is still in flight
    AlreadyPending,
}

/// How a submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// An assistant turn was appended
    Answered,
    /// The request failed and the apology turn was appended
    Degraded,
    /// Nothing happened
    Ignored(SubmitIgnored),
    /// The controller was dropped before the reply arrived
    Detached,
}

#[derive(Debug, Default)]
struct SessionState {
    messages: Vec<Message>,
    session_id: Option<String>,
    phase: ControllerPhase,
    suggested: Vec<String>,
    last_assessment: Option<String>,
}

impl SessionState {
    fn apply_reply(&mut self, reply: ChatReply) {
        let image = reply.image.as_deref().and_then(decode_image);
        self.messages.push(Message::assistant(reply.response, image));
        self.suggested = reply.suggested_questions.unwrap_or_default();
        self.last_assessment = reply
            .competency_assessment
            .filter(|assessment| !assessment.trim().is_empty());

        match (self.session_id.as_deref(), reply.session_id) {
            (None, Some(id)) => {
                tracing::debug!(target: "socrates.session", session_id = %id, "adopted backend session");
                self.session_id = Some(id);
            }
            (Some(current), Some(id)) if current != id => {
                tracing::warn!(
                    target: "socrates.session",
                    current = %current,
                    received = %id,
                    "backend returned a different session id; keeping the current one"
                );
            }
            _ => {}
        }
    }

    fn apply_failure(&mut self) {
        self.messages.push(Message::error(APOLOGY_TEXT));
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Session state lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Marks an in-flight turn; if the turn is abandoned before a result is
/// applied, the apology is appended and the phase returns to Idle.
struct PendingTurn {
    state: Weak<Mutex<SessionState>>,
    armed: bool,
}

impl PendingTurn {
    fn disarm(mut self) -> Weak<Mutex<SessionState>> {
        self.armed = false;
        self.state.clone()
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(shared) = self.state.upgrade() {
            tracing::warn!(target: "socrates.session", "chat request abandoned before completion");
            let mut state = lock_state(&shared);
            state.apply_failure();
            state.phase = ControllerPhase::Idle;
        }
    }
}

/// Drives one conversation with the tutor backend
pub struct SessionController {
    backend: Arc<dyn TutorBackend>,
    trail_id: Option<String>,
    state: Arc<Mutex<SessionState>>,
}

impl SessionController {
    /// Create a controller with an empty log.
    pub fn new(backend: Arc<dyn TutorBackend>) -> Self {
        Self {
            backend,
            trail_id: None,
            state: Arc::default(),
        }
    }

    /// Attach every request to a learning trail.
    pub fn with_trail(mut self, trail_id: impl Into<String>) -> Self {
        self.trail_id = Some(trail_id.into());
        self
    }

    /// Submit a user turn and wait for the cycle to finish.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        match self.begin(text) {
            Ok((turn, request)) => Self::complete(Arc::clone(&self.backend), turn, request).await,
            Err(reason) => SubmitOutcome::Ignored(reason),
        }
    }

    /// Submit a user turn and run the network half on a background task.
    ///
    /// The user turn is appended and the phase set to Pending before this
    /// returns. Must be called from within a tokio runtime.
    pub fn spawn_submit(
        &self,
        text: &str,
    ) -> std::result::Result<JoinHandle<SubmitOutcome>, SubmitIgnored> {
        let (turn, request) = self.begin(text)?;
        let backend = Arc::clone(&self.backend);
        Ok(tokio::spawn(Self::complete(backend, turn, request)))
    }

    /// Synchronous half: guard, append the user turn, enter Pending.
    fn begin(
        &self,
        text: &str,
    ) -> std::result::Result<(PendingTurn, ChatRequest), SubmitIgnored> {
        if text.trim().is_empty() {
            return Err(SubmitIgnored::EmptyInput);
        }

        let mut state = lock_state(&self.state);
        if state.phase == ControllerPhase::Pending {
            tracing::debug!(target: "socrates.session", "submission dropped: request already in flight");
            return Err(SubmitIgnored::AlreadyPending);
        }

        state.messages.push(Message::user(text));
        state.phase = ControllerPhase::Pending;

        let turn = PendingTurn {
            state: Arc::downgrade(&self.state),
            armed: true,
        };
        let request = ChatRequest {
            message: text.to_string(),
            session_id: state.session_id.clone(),
            trail_id: self.trail_id.clone(),
        };
        Ok((turn, request))
    }

    /// Network half: issue the request and apply the result if still alive.
    async fn complete(
        backend: Arc<dyn TutorBackend>,
        turn: PendingTurn,
        request: ChatRequest,
    ) -> SubmitOutcome {
        let result = backend.chat(request).await;
        let weak = turn.disarm();

        let Some(shared) = weak.upgrade() else {
            tracing::debug!(target: "socrates.session", "controller dropped; discarding chat result");
            return SubmitOutcome::Detached;
        };
        let mut state = lock_state(&shared);

        let outcome = match result {
            Ok(reply) => {
                state.apply_reply(reply);
                SubmitOutcome::Answered
            }
            Err(err) => {
                let kind = match &err {
                    SocratesError::Api(api) => api.kind(),
                    _ => "client",
                };
                tracing::warn!(target: "socrates.session", kind, error = %err, "chat request failed");
                state.apply_failure();
                SubmitOutcome::Degraded
            }
        };
        state.phase = ControllerPhase::Idle;
        outcome
    }

    /// Start a fresh conversation. Refused while a request is in flight.
    pub fn reset(&self) -> Result<()> {
        let mut state = lock_state(&self.state);
        if state.phase == ControllerPhase::Pending {
            return Err(SocratesError::InvalidInput(
                "Cannot start a new conversation while a reply is pending".to_string(),
            ));
        }
        *state = SessionState::default();
        tracing::debug!(target: "socrates.session", "conversation reset");
        Ok(())
    }

    /// Snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        lock_state(&self.state).messages.clone()
    }

    pub fn message_count(&self) -> usize {
        lock_state(&self.state).messages.len()
    }

    pub fn last_message(&self) -> Option<Message> {
        lock_state(&self.state).messages.last().cloned()
    }

    pub fn session_id(&self) -> Option<String> {
        lock_state(&self.state).session_id.clone()
    }

    /// First eight characters of the session id, or "Nova" before one exists.
    pub fn short_session_label(&self) -> String {
        match lock_state(&self.state).session_id.as_deref() {
            Some(id) => id.chars().take(8).collect(),
            None => "Nova".to_string(),
        }
    }

    pub fn suggested(&self) -> Vec<String> {
        lock_state(&self.state).suggested.clone()
    }

    /// Follow-ups to offer: the latest suggestions, or the starter prompts
    /// while the conversation is still empty.
    pub fn prompt_options(&self) -> Vec<String> {
        let state = lock_state(&self.state);
        if !state.suggested.is_empty() {
            state.suggested.clone()
        } else if state.messages.is_empty() {
            STARTER_QUESTIONS.iter().map(|q| q.to_string()).collect()
        } else {
            Vec::new()
        }
    }

    pub fn last_assessment(&self) -> Option<String> {
        lock_state(&self.state).last_assessment.clone()
    }

    pub fn phase(&self) -> ControllerPhase {
        lock_state(&self.state).phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase() == ControllerPhase::Pending
    }
}
