//! Push delivery channel seam
//!
//! Abstraction over the external multicast push transport. One send targets
//! all of a contact's delivery tokens at once and reports a per-token
//! outcome, so the caller can distinguish terminal token failures (prune)
//! from transient ones (keep).

#![warn(missing_docs)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Push transport errors (the whole multicast request failed)
#[derive(Debug, Error)]
pub enum PushError {
    /// Transport unreachable or connection-level failure
    #[error("Push transport unreachable: {0}")]
    Unavailable(String),

    /// Transport rejected the request before attempting delivery
    #[error("Push request rejected: {0}")]
    Rejected(String),
}

/// Per-token failure classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PushErrorKind {
    /// Token is malformed or was never valid; remove it
    InvalidToken,
    /// Token was valid but the install unregistered; remove it
    Unregistered,
    /// Transient delivery failure (network, timeout); keep the token
    Unavailable,
    /// Transport-internal error; keep the token
    Internal,
}

impl PushErrorKind {
    /// Terminal failures mean the token is permanently unusable
    pub fn is_terminal(&self) -> bool {
        matches!(self, PushErrorKind::InvalidToken | PushErrorKind::Unregistered)
    }
}

/// Notification content (title and body shown to the receiving client)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Notification title
    pub title: String,
    /// Notification body
    pub body: String,
}

/// Outcome of delivery to a single token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendOutcome {
    /// Token this outcome refers to
    pub token: String,
    /// Whether the message was accepted for this token
    pub delivered: bool,
    /// Failure classification when not delivered
    pub error: Option<PushErrorKind>,
}

/// Aggregated result of one multicast send
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MulticastOutcome {
    /// Number of tokens that accepted the message
    pub success_count: usize,
    /// Number of tokens that failed
    pub failure_count: usize,
    /// Per-token outcomes, in input token order
    pub responses: Vec<SendOutcome>,
}

impl MulticastOutcome {
    /// Build an outcome from per-token results
    pub fn from_responses(responses: Vec<SendOutcome>) -> Self {
        let success_count = responses.iter().filter(|r| r.delivered).count();
        let failure_count = responses.len() - success_count;
        Self {
            success_count,
            failure_count,
            responses,
        }
    }

    /// Build an outcome where every token accepted the message
    pub fn all_delivered(tokens: &[String]) -> Self {
        Self::from_responses(
            tokens
                .iter()
                .map(|t| SendOutcome {
                    token: t.clone(),
                    delivered: true,
                    error: None,
                })
                .collect(),
        )
    }

    /// At least one token accepted the message
    pub fn delivered_any(&self) -> bool {
        self.success_count > 0
    }

    /// Tokens whose failure was terminal and should be pruned
    pub fn terminal_tokens(&self) -> Vec<String> {
        self.responses
            .iter()
            .filter(|r| r.error.map(|e| e.is_terminal()).unwrap_or(false))
            .map(|r| r.token.clone())
            .collect()
    }
}

/// Multicast push transport seam
///
/// Implementations wrap the real delivery provider; tests use scripted
/// fakes. The transport may impose its own timeouts; the coordinator never
/// cancels an in-flight send.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Send one notification to all given tokens, returning per-token outcomes
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &Notification,
        data: &HashMap<String, String>,
    ) -> Result<MulticastOutcome, PushError>;
}
