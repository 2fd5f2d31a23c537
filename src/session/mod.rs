// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Conversation session
//!
//! The message log and the controller that drives one request/response
//! cycle per submitted user turn.

pub mod controller;
pub mod message;

pub use controller::{
    ControllerPhase, SessionController, SubmitIgnored, SubmitOutcome, APOLOGY_TEXT,
    STARTER_QUESTIONS,
};
pub use message::{Message, MessageRole};
