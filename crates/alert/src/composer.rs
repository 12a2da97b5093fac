//! Alert message composition
//!
//! Builds the notification content once per fired transition: fixed
//! per-category title, custom or default body, and the structured data
//! payload the receiving client renders (location text, map link, urgency
//! flag).

#![warn(missing_docs)]

use crate::push::Notification;
use std::collections::HashMap;
use vigil_domain::{GeoPoint, SosCategory};

/// Literal carried in the payload when no usable fix exists
pub const LOCATION_UNAVAILABLE: &str = "Ubicación no disponible";

/// Composed notification content for one alert event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// Title and body shown by the receiving client
    pub notification: Notification,
    /// Structured payload (string map per the push transport contract)
    pub data: HashMap<String, String>,
}

impl AlertMessage {
    /// Alert body text
    pub fn body(&self) -> &str {
        &self.notification.body
    }
}

/// Human-readable location line: fixed 6-decimal coordinates or the
/// unavailable marker
fn location_text(location: Option<&GeoPoint>) -> String {
    match location {
        Some(point) => format!(
            "Lat: {:.6}, Lon: {:.6}",
            point.latitude, point.longitude
        ),
        None => LOCATION_UNAVAILABLE.to_string(),
    }
}

/// Map link for the fix, empty when unavailable
fn location_url(location: Option<&GeoPoint>) -> String {
    match location {
        Some(point) => format!(
            "https://maps.google.com/?q={},{}",
            point.latitude, point.longitude
        ),
        None => String::new(),
    }
}

/// Compose the notification for one fired transition
///
/// * `custom_message` - device-configured body override for this category
/// * `now_ms` - event timestamp carried in the payload (string form)
pub fn compose(
    category: SosCategory,
    custom_message: Option<&str>,
    location: Option<&GeoPoint>,
    device_id: &str,
    owner_name: &str,
    now_ms: u64,
) -> AlertMessage {
    let body = custom_message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| category.default_message())
        .to_string();

    let mut data = HashMap::new();
    data.insert("type".to_string(), "sos_alert".to_string());
    data.insert("sosType".to_string(), category.key().to_string());
    data.insert("deviceId".to_string(), device_id.to_string());
    data.insert("ownerName".to_string(), owner_name.to_string());
    data.insert("location".to_string(), location_text(location));
    data.insert("locationUrl".to_string(), location_url(location));
    data.insert("timestamp".to_string(), now_ms.to_string());
    data.insert("urgent".to_string(), "true".to_string());

    AlertMessage {
        notification: Notification {
            title: category.title().to_string(),
            body,
        },
        data,
    }
}
