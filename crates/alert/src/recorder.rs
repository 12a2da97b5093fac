//! Outcome recording
//!
//! Writes the durable record of one fired transition: an alert event in
//! the source device's history, an inbox event for every contact that had
//! a real delivery attempt, and the device's processed/summary stamps.
//! Every write is best-effort and individually logged; by this stage the
//! pushes are already out, so nothing here may fail the operation.

#![warn(missing_docs)]

use crate::composer::AlertMessage;
use crate::fanout::{ContactDispatch, FanoutResult};
use crate::store::DocumentStore;
use std::sync::Arc;
use tracing::warn;
use vigil_domain::{AlertEvent, Device, LastAlertSummary, NotifiedContact, SosCategory};

/// Writer for alert events and post-fanout device stamps
pub struct OutcomeRecorder<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> OutcomeRecorder<S> {
    /// Create a recorder backed by the given store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record one completed fanout
    ///
    /// Writes, in order: the device-history event, one inbox event per
    /// attempted contact, and the device stamps. A failure in any write is
    /// logged and does not block the others.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        device: &Device,
        category: SosCategory,
        owner_name: &str,
        message: &AlertMessage,
        dispatches: &[ContactDispatch],
        result: FanoutResult,
        now_ms: u64,
    ) {
        let notified_contacts: Vec<NotifiedContact> = dispatches
            .iter()
            .map(|d| NotifiedContact {
                uid: d.contact_uid.clone(),
                name: d.display_name.clone(),
            })
            .collect();

        let device_event = AlertEvent::new(
            &device.device_id,
            &device.owner_uid,
            owner_name,
            category,
            message.body(),
            device.last_location.clone(),
            now_ms,
            result.notified,
            result.failed,
            notified_contacts.clone(),
        );
        if let Err(e) = self
            .store
            .append_device_alert(&device.owner_uid, &device.device_id, device_event)
            .await
        {
            warn!(
                device_id = %device.device_id,
                error = %e,
                "Failed to write device alert history"
            );
        }

        for dispatch in dispatches.iter().filter(|d| d.attempted) {
            let inbox_event = AlertEvent::new(
                &device.device_id,
                &device.owner_uid,
                owner_name,
                category,
                message.body(),
                device.last_location.clone(),
                now_ms,
                result.notified,
                result.failed,
                notified_contacts.clone(),
            );
            if let Err(e) = self
                .store
                .append_contact_alert(&dispatch.contact_uid, inbox_event)
                .await
            {
                warn!(
                    contact_uid = %dispatch.contact_uid,
                    error = %e,
                    "Failed to write contact inbox event"
                );
            }
        }

        let summary = LastAlertSummary {
            timestamp: now_ms,
            sos_type: category,
            notified_count: result.notified,
            failed_count: result.failed,
        };
        if let Err(e) = self
            .store
            .stamp_fanout_outcome(&device.owner_uid, &device.device_id, now_ms, summary)
            .await
        {
            warn!(
                device_id = %device.device_id,
                error = %e,
                "Failed to stamp fanout outcome"
            );
        }
    }
}
