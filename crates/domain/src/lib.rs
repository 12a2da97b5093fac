//! Vigil Domain - Data model for the personal-safety alerting platform
//!
//! This crate defines the persisted and wire-level records shared across
//! the Vigil backend:
//! - Device status enumeration and SOS categories
//! - Device records (owner, location, emergency contacts, custom messages)
//! - User records with the bounded delivery-token registry
//! - Alert events (device history and contact inbox projections)
//!
//! The types here are pure data; all orchestration lives in `vigil-alert`.

#![warn(missing_docs)]

pub mod alert;
pub mod device;
pub mod status;
pub mod user;

// Re-export commonly used types
pub use alert::{AlertEvent, NotifiedContact};
pub use device::{Device, EmergencyContact, GeoPoint, LastAlertSummary};
pub use status::{DeviceStatus, SosCategory};
pub use user::{User, MAX_TOKENS_PER_USER};
