//! Device records and their embedded value types
//!
//! A `Device` is one physical unit keyed by `(owner_uid, device_id)`. It is
//! created by provisioning (external), mutated by telemetry ingress and by
//! the fanout post-processing stamps.

#![warn(missing_docs)]

use crate::status::{DeviceStatus, SosCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last known geographic fix reported by a device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: Option<f64>,
    /// Capture timestamp in epoch milliseconds
    pub captured_at: Option<u64>,
}

/// One entry in a device's emergency-contact list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyContact {
    /// UID of the contact's user record
    pub contact_uid: String,
    /// Display name configured on the device
    pub display_name: String,
}

/// Outcome of the most recent fanout, stamped on the device for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastAlertSummary {
    /// Fanout timestamp in epoch milliseconds
    pub timestamp: u64,
    /// Emergency category that fired
    pub sos_type: SosCategory,
    /// Contacts classified as notified
    pub notified_count: usize,
    /// Contacts classified as failed
    pub failed_count: usize,
}

/// Persisted device record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    /// Externally assigned device identifier
    pub device_id: String,
    /// Owning user identity; immutable outside re-provisioning
    pub owner_uid: String,
    /// Current status
    #[serde(default)]
    pub status: DeviceStatus,
    /// Last known location, if any fix has been reported
    pub last_location: Option<GeoPoint>,
    /// Ordered notification target set for this device
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    /// Per-category custom alert body overrides, keyed by category key
    #[serde(default)]
    pub sos_messages: HashMap<String, String>,
    /// Epoch millis of the last emergency transition that completed fanout
    #[serde(default)]
    pub last_processed_transition_at: u64,
    /// Outcome of the last fanout
    pub last_alert_summary: Option<LastAlertSummary>,
    /// Epoch millis of the last telemetry write
    #[serde(default)]
    pub updated_at: u64,
    /// Set when the device has been flagged for re-provisioning
    #[serde(default)]
    pub reset_pending: bool,
}

impl Device {
    /// Create a freshly provisioned device with no telemetry yet
    pub fn new(device_id: impl Into<String>, owner_uid: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            owner_uid: owner_uid.into(),
            status: DeviceStatus::Unknown,
            last_location: None,
            emergency_contacts: Vec::new(),
            sos_messages: HashMap::new(),
            last_processed_transition_at: 0,
            last_alert_summary: None,
            updated_at: 0,
            reset_pending: false,
        }
    }

    /// Custom alert body for a category, if configured and non-empty
    ///
    /// Records written by older clients keyed the medical override by its
    /// accented display form, so that key is honored as a fallback.
    pub fn custom_message(&self, category: SosCategory) -> Option<&str> {
        self.sos_messages
            .get(category.key())
            .or_else(|| {
                category
                    .legacy_key()
                    .and_then(|key| self.sos_messages.get(key))
            })
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }
}
