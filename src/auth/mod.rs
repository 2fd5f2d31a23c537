// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Bearer-token access for backend requests

pub mod token;

pub use token::{StaticToken, TokenSource, TokenStore};
