// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Socrates' Echo - client for a Socratic philosophy tutor.
//!
//! This crate exposes the shared runtime used by the `socrates` CLI
//! (`src/main.rs`):
//! - `session`: the conversation controller (message log, session id,
//!   pending guard, suggested questions)
//! - `provider`: the provider configuration gate (provider/key/model,
//!   validation and persistence)
//! - `api`: wire types, the `TutorBackend` seam, the HTTP client and a mock
//! - `auth`: bearer-token sources
//! - `config`: user settings under `~/.socrates`

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod session;

pub use error::{Result, SocratesError};
