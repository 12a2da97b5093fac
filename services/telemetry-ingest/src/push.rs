//! Push transport stand-in for the ingest service
//!
//! The real multicast push provider is an external collaborator wired in
//! at deployment. This development transport logs every send and reports
//! all tokens as delivered, so the fanout pipeline can be exercised end to
//! end without provider credentials.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;
use vigil_alert::push::{MulticastOutcome, Notification, PushChannel, PushError};

/// Log-only push transport
pub struct LogOnlyPush;

#[async_trait]
impl PushChannel for LogOnlyPush {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &Notification,
        _data: &HashMap<String, String>,
    ) -> Result<MulticastOutcome, PushError> {
        info!(
            tokens = tokens.len(),
            title = %notification.title,
            "Push send (log-only transport)"
        );
        Ok(MulticastOutcome::all_delivered(tokens))
    }
}
