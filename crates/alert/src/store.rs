//! Document store seam and in-memory implementation
//!
//! The durable key-document store is an external collaborator; this module
//! specifies the operations the alert engine depends on. Token removal is
//! an array-remove (set difference), never a whole-set overwrite, so
//! concurrent removals from overlapping fanouts compose safely.

#![warn(missing_docs)]

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use vigil_domain::{AlertEvent, Device, LastAlertSummary, User};

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested document does not exist
    #[error("Document not found: {collection}/{key}")]
    NotFound {
        /// Logical collection name
        collection: &'static str,
        /// Document key
        key: String,
    },

    /// Backend-level failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result of a token registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRegistration {
    /// The token was already present
    pub duplicate: bool,
    /// Token count after the operation
    pub total_tokens: usize,
}

/// Key-document store operations consumed by the alert engine
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a device by owner and device id
    async fn get_device(
        &self,
        owner_uid: &str,
        device_id: &str,
    ) -> Result<Option<Device>, StoreError>;

    /// Create or replace a device record
    async fn put_device(&self, device: Device) -> Result<(), StoreError>;

    /// Fetch a user by uid
    async fn get_user(&self, uid: &str) -> Result<Option<User>, StoreError>;

    /// Create or replace a user record
    async fn put_user(&self, user: User) -> Result<(), StoreError>;

    /// Register a delivery token for a user (dedupe + bounded FIFO)
    async fn register_user_token(
        &self,
        uid: &str,
        token: &str,
    ) -> Result<TokenRegistration, StoreError>;

    /// Remove exactly the given tokens from a user's registry
    async fn remove_user_tokens(&self, uid: &str, tokens: &[String]) -> Result<(), StoreError>;

    /// Append an alert event to a device's own history
    async fn append_device_alert(
        &self,
        owner_uid: &str,
        device_id: &str,
        event: AlertEvent,
    ) -> Result<(), StoreError>;

    /// Append an alert event to a contact's received-alerts inbox
    async fn append_contact_alert(
        &self,
        contact_uid: &str,
        event: AlertEvent,
    ) -> Result<(), StoreError>;

    /// Stamp a device with the fanout outcome and processed-at marker
    async fn stamp_fanout_outcome(
        &self,
        owner_uid: &str,
        device_id: &str,
        processed_at_ms: u64,
        summary: LastAlertSummary,
    ) -> Result<(), StoreError>;
}

#[derive(Default)]
struct MemoryInner {
    devices: HashMap<(String, String), Device>,
    users: HashMap<String, User>,
    device_alerts: HashMap<(String, String), Vec<AlertEvent>>,
    inboxes: HashMap<String, Vec<AlertEvent>>,
}

/// In-memory document store
///
/// Backs the service in development and the test suites. All collections
/// live behind one `RwLock`; contention is irrelevant at this scale.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a device's alert history (test/diagnostic accessor)
    pub async fn device_alerts(&self, owner_uid: &str, device_id: &str) -> Vec<AlertEvent> {
        self.inner
            .read()
            .await
            .device_alerts
            .get(&(owner_uid.to_string(), device_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of a contact's inbox (test/diagnostic accessor)
    pub async fn inbox(&self, contact_uid: &str) -> Vec<AlertEvent> {
        self.inner
            .read()
            .await
            .inboxes
            .get(contact_uid)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_device(
        &self,
        owner_uid: &str,
        device_id: &str,
    ) -> Result<Option<Device>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .devices
            .get(&(owner_uid.to_string(), device_id.to_string()))
            .cloned())
    }

    async fn put_device(&self, device: Device) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .devices
            .insert((device.owner_uid.clone(), device.device_id.clone()), device);
        Ok(())
    }

    async fn get_user(&self, uid: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(uid).cloned())
    }

    async fn put_user(&self, user: User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.uid.clone(), user);
        Ok(())
    }

    async fn register_user_token(
        &self,
        uid: &str,
        token: &str,
    ) -> Result<TokenRegistration, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(uid).ok_or(StoreError::NotFound {
            collection: "users",
            key: uid.to_string(),
        })?;
        let duplicate = user.register_token(token);
        Ok(TokenRegistration {
            duplicate,
            total_tokens: user.delivery_tokens.len(),
        })
    }

    async fn remove_user_tokens(&self, uid: &str, tokens: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(uid).ok_or(StoreError::NotFound {
            collection: "users",
            key: uid.to_string(),
        })?;
        user.remove_tokens(tokens);
        Ok(())
    }

    async fn append_device_alert(
        &self,
        owner_uid: &str,
        device_id: &str,
        event: AlertEvent,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .device_alerts
            .entry((owner_uid.to_string(), device_id.to_string()))
            .or_default()
            .push(event);
        Ok(())
    }

    async fn append_contact_alert(
        &self,
        contact_uid: &str,
        event: AlertEvent,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .inboxes
            .entry(contact_uid.to_string())
            .or_default()
            .push(event);
        Ok(())
    }

    async fn stamp_fanout_outcome(
        &self,
        owner_uid: &str,
        device_id: &str,
        processed_at_ms: u64,
        summary: LastAlertSummary,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let device = inner
            .devices
            .get_mut(&(owner_uid.to_string(), device_id.to_string()))
            .ok_or(StoreError::NotFound {
                collection: "devices",
                key: format!("{}/{}", owner_uid, device_id),
            })?;
        device.last_processed_transition_at = processed_at_ms;
        device.last_alert_summary = Some(summary);
        Ok(())
    }
}
