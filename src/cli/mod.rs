// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! CLI module for Socrates
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::*;
