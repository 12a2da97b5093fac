//! User records and the bounded delivery-token registry
//!
//! A user may be a device owner, an emergency contact, or both. Each user
//! carries a set of opaque push-channel tokens, one per installed client,
//! bounded so stale installs cannot accumulate forever.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Maximum delivery tokens retained per user; oldest are evicted first
pub const MAX_TOKENS_PER_USER: usize = 10;

/// Persisted user record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// User identity
    pub uid: String,
    /// Display name
    pub name: String,
    /// Delivery-channel tokens, insertion-ordered, deduplicated
    #[serde(default)]
    pub delivery_tokens: Vec<String>,
}

impl User {
    /// Create a user with no registered tokens
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            delivery_tokens: Vec::new(),
        }
    }

    /// Register a delivery token
    ///
    /// Duplicates are silently ignored. When the bound is exceeded the
    /// oldest tokens are evicted so the newest `MAX_TOKENS_PER_USER` remain.
    /// Returns `true` if the token was already registered.
    pub fn register_token(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if self.delivery_tokens.contains(&token) {
            return true;
        }
        self.delivery_tokens.push(token);
        if self.delivery_tokens.len() > MAX_TOKENS_PER_USER {
            let excess = self.delivery_tokens.len() - MAX_TOKENS_PER_USER;
            self.delivery_tokens.drain(..excess);
        }
        false
    }

    /// Remove exactly the given tokens, leaving all others intact
    ///
    /// Set-difference semantics: removals from concurrent writers compose
    /// without clobbering each other, and replays are no-ops.
    pub fn remove_tokens(&mut self, tokens: &[String]) {
        self.delivery_tokens.retain(|t| !tokens.contains(t));
    }
}
