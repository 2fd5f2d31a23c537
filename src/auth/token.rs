// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Token sources
//!
//! The HTTP client never reads credentials from ambient state; it is handed
//! a [`TokenSource`] at construction time and asks it for the current bearer
//! token on every request.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::Result;

/// Supplies the bearer token attached to backend requests
pub trait TokenSource: Send + Sync {
    /// Current token, if the user is logged in.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token (or none), mostly for tests and one-shot commands
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// File-backed token with an environment override
///
/// Priority: env var > cached value > file on disk.
pub struct TokenStore {
    path: PathBuf,
    env_var: Option<String>,
    cached: RwLock<Option<String>>,
}

impl TokenStore {
    /// Open a store at `path`, loading any token already on disk.
    pub fn open(path: impl Into<PathBuf>, env_var: Option<String>) -> Result<Self> {
        let path = path.into();
        let cached = Self::read_file(&path)?;
        Ok(Self {
            path,
            env_var,
            cached: RwLock::new(cached),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a new token and make it visible immediately.
    pub fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        restrict_permissions(&self.path)?;
        *self.write_cache() = Some(token.to_string());
        tracing::debug!(target: "socrates.auth", path = %self.path.display(), "stored bearer token");
        Ok(())
    }

    /// Forget the token (logout).
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        *self.write_cache() = None;
        Ok(())
    }

    fn read_file(path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let token = content.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        match self.cached.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Token cache lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl TokenSource for TokenStore {
    fn bearer_token(&self) -> Option<String> {
        if let Some(var) = &self.env_var {
            if let Ok(token) = std::env::var(var) {
                if !token.trim().is_empty() {
                    return Some(token);
                }
            }
        }
        match self.cached.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
