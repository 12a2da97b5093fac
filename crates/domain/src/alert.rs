//! Alert events - the immutable record of one emergency transition
//!
//! One logical event has two physical projections: an entry in the source
//! device's own alert history (owner-visible) and one entry per notified
//! contact's inbox (contact-visible, carries an `acknowledged` flag).

#![warn(missing_docs)]

use crate::device::GeoPoint;
use crate::status::SosCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A contact included in an alert's notified set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifiedContact {
    /// Contact UID
    pub uid: String,
    /// Contact display name
    pub name: String,
}

/// Immutable record of one emergency transition and its outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertEvent {
    /// Event identifier
    pub id: String,
    /// Device that raised the alert
    pub source_device_id: String,
    /// Owner of the source device
    pub source_owner_uid: String,
    /// Owner display name at composition time
    pub source_owner_name: String,
    /// Emergency category
    pub sos_type: SosCategory,
    /// Alert body delivered to contacts
    pub message: String,
    /// Location at the time of the alert, if known
    pub location: Option<GeoPoint>,
    /// Creation timestamp in epoch milliseconds
    pub created_at: u64,
    /// Contacts classified as notified
    pub notified_count: usize,
    /// Contacts classified as failed
    pub failed_count: usize,
    /// Full notified-contact list, independent of per-contact push success
    pub notified_contacts: Vec<NotifiedContact>,
    /// Contact-side acknowledgement flag; always false on creation and
    /// omitted from serialized records until a contact acknowledges, so the
    /// device-history projection never carries it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub acknowledged: bool,
}

impl AlertEvent {
    /// Build a new alert event with a fresh id and `acknowledged = false`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_device_id: impl Into<String>,
        source_owner_uid: impl Into<String>,
        source_owner_name: impl Into<String>,
        sos_type: SosCategory,
        message: impl Into<String>,
        location: Option<GeoPoint>,
        created_at: u64,
        notified_count: usize,
        failed_count: usize,
        notified_contacts: Vec<NotifiedContact>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_device_id: source_device_id.into(),
            source_owner_uid: source_owner_uid.into(),
            source_owner_name: source_owner_name.into(),
            sos_type,
            message: message.into(),
            location,
            created_at,
            notified_count,
            failed_count,
            notified_contacts,
            acknowledged: false,
        }
    }
}
