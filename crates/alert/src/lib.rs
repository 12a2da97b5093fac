//! Vigil Alert - SOS fanout and device-state transition engine
//!
//! This crate is the core of the Vigil backend. It handles:
//! - Emergency transition detection over device status updates
//! - Contact resolution against the user store
//! - Alert message composition (title, body, structured payload)
//! - Concurrent multicast fanout with per-contact accounting
//! - Invalid delivery-token pruning
//! - Durable outcome recording (device history + contact inboxes)
//!
//! # Architecture
//!
//! A device status update flows through the following pipeline:
//! 1. The external trigger calls `FanoutCoordinator::on_device_updated`
//! 2. `TransitionDetector` decides whether the update fires an alert
//! 3. `ContactResolver` attaches delivery tokens to each emergency contact
//! 4. `composer` builds the notification content once per event
//! 5. One delivery per contact is dispatched concurrently and all settle
//! 6. Terminal token failures are pruned from the contact's registry
//! 7. `OutcomeRecorder` writes the alert event and stamps the device
//!
//! Nothing in this pipeline propagates an error back to the trigger; every
//! failure is logged and absorbed, because the trigger has no retry
//! contract and the pushes must not be sent twice.
//!
//! # Collaborator seams
//!
//! The document store and the push transport are consumed through the
//! `DocumentStore` and `PushChannel` traits so the coordinator can be
//! composed with real backends in production and scripted fakes in tests.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil_alert::{FanoutCoordinator, MemoryStore};
//! use vigil_alert::push::{MulticastOutcome, Notification, PushChannel, PushError};
//! use vigil_domain::Device;
//!
//! # struct NoopPush;
//! # #[async_trait::async_trait]
//! # impl PushChannel for NoopPush {
//! #     async fn send_multicast(
//! #         &self,
//! #         tokens: &[String],
//! #         _notification: &Notification,
//! #         _data: &std::collections::HashMap<String, String>,
//! #     ) -> Result<MulticastOutcome, PushError> {
//! #         Ok(MulticastOutcome::all_delivered(tokens))
//! #     }
//! # }
//! # async fn run() {
//! let store = Arc::new(MemoryStore::new());
//! let push = Arc::new(NoopPush);
//! let coordinator = FanoutCoordinator::new(store, push);
//!
//! let before = Device::new("dev-0001-abcdef", "owner-0001-abcdef");
//! let after = before.clone();
//! coordinator
//!     .on_device_updated("owner-0001-abcdef", "dev-0001-abcdef", &before, &after)
//!     .await;
//! # }
//! ```

#![warn(missing_docs)]

pub mod composer;
pub mod fanout;
pub mod push;
pub mod recorder;
pub mod resolver;
pub mod store;
pub mod transition;

// Re-export commonly used types
pub use composer::{compose, AlertMessage};
pub use fanout::{ContactDispatch, FanoutCoordinator, FanoutResult};
pub use push::{MulticastOutcome, Notification, PushChannel, PushError, PushErrorKind, SendOutcome};
pub use recorder::OutcomeRecorder;
pub use resolver::{ContactResolver, ResolvedTarget};
pub use store::{DocumentStore, MemoryStore, StoreError, TokenRegistration};
pub use transition::{Decision, IgnoreReason, TransitionDetector, DEFAULT_COOLDOWN_MS};

/// Current time in epoch milliseconds
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
