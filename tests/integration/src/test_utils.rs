//! Shared fixtures for the fanout integration tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vigil_alert::push::{
    MulticastOutcome, Notification, PushChannel, PushError, PushErrorKind, SendOutcome,
};
use vigil_alert::store::{DocumentStore, MemoryStore};
use vigil_domain::{Device, DeviceStatus, EmergencyContact, User};

/// Scripted push transport whose per-token outcome is encoded in the token
/// name: `bad-*` fails as invalid, `gone-*` as unregistered, `flaky-*` as a
/// transient failure; everything else delivers.
pub struct ScriptedPush {
    calls: AtomicUsize,
    transport_down: bool,
}

impl ScriptedPush {
    /// Transport that answers every multicast
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            transport_down: false,
        }
    }

    /// Transport that fails every multicast at the connection level
    pub fn unreachable() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            transport_down: true,
        }
    }

    /// Number of multicast sends attempted so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedPush {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushChannel for ScriptedPush {
    async fn send_multicast(
        &self,
        tokens: &[String],
        _notification: &Notification,
        _data: &HashMap<String, String>,
    ) -> Result<MulticastOutcome, PushError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.transport_down {
            return Err(PushError::Unavailable("connection refused".to_string()));
        }
        Ok(MulticastOutcome::from_responses(
            tokens
                .iter()
                .map(|token| {
                    let error = if token.starts_with("bad-") {
                        Some(PushErrorKind::InvalidToken)
                    } else if token.starts_with("gone-") {
                        Some(PushErrorKind::Unregistered)
                    } else if token.starts_with("flaky-") {
                        Some(PushErrorKind::Unavailable)
                    } else {
                        None
                    };
                    SendOutcome {
                        token: token.clone(),
                        delivered: error.is_none(),
                        error,
                    }
                })
                .collect(),
        ))
    }
}

/// Store a user with the given tokens
pub async fn seed_user(store: &Arc<MemoryStore>, uid: &str, name: &str, tokens: &[&str]) {
    let mut user = User::new(uid, name);
    for token in tokens {
        user.register_token(*token);
    }
    store.put_user(user).await.unwrap();
}

/// Store a device owned by `owner_uid` with the given contact list
pub async fn seed_device(
    store: &Arc<MemoryStore>,
    owner_uid: &str,
    device_id: &str,
    status: DeviceStatus,
    contacts: &[(&str, &str)],
) -> Device {
    let mut device = Device::new(device_id, owner_uid);
    device.status = status;
    device.emergency_contacts = contacts
        .iter()
        .map(|(uid, name)| EmergencyContact {
            contact_uid: uid.to_string(),
            display_name: name.to_string(),
        })
        .collect();
    store.put_device(device.clone()).await.unwrap();
    device
}
