//! Fanout coordination
//!
//! Orchestrates one detected emergency transition end to end: resolve
//! contacts, compose the message once, dispatch one delivery per contact
//! concurrently, wait for all to settle, prune dead tokens, and record the
//! outcome. The public operation never propagates an error back to the
//! trigger; by the time anything can fail, pushes have already been sent
//! and must not be retried.

#![warn(missing_docs)]

use crate::composer::{compose, AlertMessage};
use crate::push::PushChannel;
use crate::recorder::OutcomeRecorder;
use crate::resolver::{ContactResolver, ResolvedTarget};
use crate::store::DocumentStore;
use crate::transition::{Decision, TransitionDetector};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vigil_domain::{Device, SosCategory};

/// Fallback display name for device owners without one
const DEFAULT_OWNER_NAME: &str = "Usuario";

/// Aggregate result of one fanout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutResult {
    /// Contacts with at least one delivered channel
    pub notified: usize,
    /// Contacts with zero delivered channels (including unresolvable and
    /// zero-token contacts)
    pub failed: usize,
}

/// Per-contact delivery accounting for one fanout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDispatch {
    /// Contact UID
    pub contact_uid: String,
    /// Contact display name
    pub display_name: String,
    /// At least one channel accepted the message
    pub delivered: bool,
    /// A real delivery was attempted (the contact had tokens and the
    /// transport was called); gates the contact-side inbox write
    pub attempted: bool,
}

/// Orchestrator for SOS alert fanout
///
/// Constructed once at the composition root with the store and push
/// transport injected; no process-wide singletons.
pub struct FanoutCoordinator<S, P> {
    store: Arc<S>,
    push: Arc<P>,
    resolver: ContactResolver<S>,
    recorder: OutcomeRecorder<S>,
    detector: TransitionDetector,
}

impl<S: DocumentStore, P: PushChannel> FanoutCoordinator<S, P> {
    /// Create a coordinator with the default transition detector
    pub fn new(store: Arc<S>, push: Arc<P>) -> Self {
        Self::with_detector(store, push, TransitionDetector::new())
    }

    /// Create a coordinator with a custom transition detector
    pub fn with_detector(store: Arc<S>, push: Arc<P>, detector: TransitionDetector) -> Self {
        Self {
            resolver: ContactResolver::new(Arc::clone(&store)),
            recorder: OutcomeRecorder::new(Arc::clone(&store)),
            store,
            push,
            detector,
        }
    }

    /// Interpret one observed device update
    ///
    /// Fire-and-forget from the caller's perspective: every internal
    /// failure is logged and absorbed, the call always returns normally.
    pub async fn on_device_updated(
        &self,
        owner_uid: &str,
        device_id: &str,
        before: &Device,
        after: &Device,
    ) {
        let now = crate::now_ms();
        let decision = self.detector.detect(
            before.status,
            after.status,
            after.last_processed_transition_at,
            now,
        );

        match decision {
            Decision::Ignore(reason) => {
                debug!(
                    owner_uid,
                    device_id,
                    from = before.status.as_str(),
                    to = after.status.as_str(),
                    ?reason,
                    "Status update ignored"
                );
            }
            Decision::Fire(category) => {
                info!(
                    owner_uid,
                    device_id,
                    sos_type = category.key(),
                    "SOS transition detected"
                );
                let result = self.fanout(after, category, now).await;
                info!(
                    owner_uid,
                    device_id,
                    notified = result.notified,
                    failed = result.failed,
                    "Fanout complete"
                );
            }
        }
    }

    /// Run the fanout for one fired transition
    ///
    /// Returns the aggregate result; when the device has no emergency
    /// contacts configured, returns `{0, 0}` and writes nothing.
    pub async fn fanout(&self, device: &Device, category: SosCategory, now_ms: u64) -> FanoutResult {
        if device.emergency_contacts.is_empty() {
            info!(
                device_id = %device.device_id,
                "No emergency contacts configured, skipping fanout"
            );
            return FanoutResult {
                notified: 0,
                failed: 0,
            };
        }

        let owner_name = self.owner_display_name(&device.owner_uid).await;
        let targets = self.resolver.resolve(&device.emergency_contacts).await;
        let message = compose(
            category,
            device.custom_message(category),
            device.last_location.as_ref(),
            &device.device_id,
            &owner_name,
            now_ms,
        );

        // One independent dispatch per contact; all settle before anything
        // downstream runs.
        let dispatches: Vec<ContactDispatch> = join_all(
            targets
                .iter()
                .map(|target| self.dispatch_one(target, &message)),
        )
        .await;

        let notified = dispatches.iter().filter(|d| d.delivered).count();
        let result = FanoutResult {
            notified,
            failed: dispatches.len() - notified,
        };

        self.recorder
            .record(device, category, &owner_name, &message, &dispatches, result, now_ms)
            .await;

        result
    }

    /// Deliver to one contact's channels and prune its dead tokens
    async fn dispatch_one(&self, target: &ResolvedTarget, message: &AlertMessage) -> ContactDispatch {
        let mut dispatch = ContactDispatch {
            contact_uid: target.contact_uid.clone(),
            display_name: target.display_name.clone(),
            delivered: false,
            attempted: false,
        };

        if !target.found {
            return dispatch;
        }
        if target.tokens.is_empty() {
            warn!(
                contact_uid = %target.contact_uid,
                "Contact has no delivery tokens registered"
            );
            return dispatch;
        }

        dispatch.attempted = true;
        let outcome = match self
            .push
            .send_multicast(&target.tokens, &message.notification, &message.data)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    contact_uid = %target.contact_uid,
                    error = %e,
                    "Push transport failed for contact"
                );
                return dispatch;
            }
        };

        debug!(
            contact_uid = %target.contact_uid,
            delivered = outcome.success_count,
            failed = outcome.failure_count,
            "Multicast settled"
        );

        let dead_tokens = outcome.terminal_tokens();
        if !dead_tokens.is_empty() {
            info!(
                contact_uid = %target.contact_uid,
                count = dead_tokens.len(),
                "Pruning invalid delivery tokens"
            );
            if let Err(e) = self
                .store
                .remove_user_tokens(&target.contact_uid, &dead_tokens)
                .await
            {
                warn!(
                    contact_uid = %target.contact_uid,
                    error = %e,
                    "Failed to prune invalid tokens"
                );
            }
        }

        dispatch.delivered = outcome.delivered_any();
        dispatch
    }

    async fn owner_display_name(&self, owner_uid: &str) -> String {
        match self.store.get_user(owner_uid).await {
            Ok(Some(user)) if !user.name.is_empty() => user.name,
            Ok(_) => DEFAULT_OWNER_NAME.to_string(),
            Err(e) => {
                warn!(owner_uid, error = %e, "Owner lookup failed");
                DEFAULT_OWNER_NAME.to_string()
            }
        }
    }
}
