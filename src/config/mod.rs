// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Configuration module for Socrates
//!
//! Handles loading, saving, and managing user settings.

pub mod settings;

pub use settings::*;
