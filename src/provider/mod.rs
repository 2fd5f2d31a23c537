// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Provider configuration
//!
//! The static provider/model catalog and the gate that validates a
//! user-supplied credential against the backend before it is used.

pub mod catalog;
pub mod gate;

pub use catalog::{default_model, default_models, Provider};
pub use gate::{
    GateConfig, ProviderConfigGate, ValidateIgnored, ValidateOutcome, ValidationResult,
};
