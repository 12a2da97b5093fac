//! Device status enumeration and SOS categories
//!
//! Raw status strings arrive from telemetry and are normalized exactly once
//! at this boundary; downstream code only ever sees the closed enums.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Emergency category carried by an SOS status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SosCategory {
    /// General emergency
    General,
    /// Medical emergency
    Medica,
    /// Security / personal-danger emergency
    Seguridad,
}

impl SosCategory {
    /// Notification title for this category
    pub fn title(&self) -> &'static str {
        match self {
            SosCategory::General => "Alerta de Emergencia",
            SosCategory::Medica => "Alerta Médica",
            SosCategory::Seguridad => "Alerta de Seguridad",
        }
    }

    /// Default notification body used when the device carries no custom message
    pub fn default_message(&self) -> &'static str {
        match self {
            SosCategory::General => "Se ha activado una alerta de emergencia.",
            SosCategory::Medica => {
                "Se ha detectado una emergencia médica. Se requiere asistencia inmediata."
            }
            SosCategory::Seguridad => {
                "Se ha detectado una situación de peligro. Se requiere asistencia."
            }
        }
    }

    /// Lowercase key used for custom-message lookup and the `sosType` data field
    pub fn key(&self) -> &'static str {
        match self {
            SosCategory::General => "general",
            SosCategory::Medica => "medica",
            SosCategory::Seguridad => "seguridad",
        }
    }

    /// Lookup-key variant written by older clients, which stored the
    /// accented display form; only the medical category differs.
    pub fn legacy_key(&self) -> Option<&'static str> {
        match self {
            SosCategory::Medica => Some("médica"),
            _ => None,
        }
    }

    /// Wire form of the full status string (`sos_*`)
    pub fn status_str(&self) -> &'static str {
        match self {
            SosCategory::General => "sos_general",
            SosCategory::Medica => "sos_medica",
            SosCategory::Seguridad => "sos_seguridad",
        }
    }

    /// Normalize an SOS subtype string, falling back to `General` for
    /// unrecognized values
    pub fn normalize(subtype: &str) -> Self {
        match subtype {
            "sos_medica" | "medica" | "médica" => SosCategory::Medica,
            "sos_seguridad" | "seguridad" => SosCategory::Seguridad,
            _ => SosCategory::General,
        }
    }
}

/// Persisted device status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Device is online and reporting normally
    Online,
    /// Device is offline or unreachable
    Offline,
    /// Device has raised an emergency of the given category
    Sos(SosCategory),
    /// Missing or unrecognized status (new records, custom strings)
    Unknown,
}

impl DeviceStatus {
    /// Parse a wire status string
    ///
    /// Anything outside the known value set maps to `Unknown` and is never
    /// treated as an emergency.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "online" => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            "sos_general" => DeviceStatus::Sos(SosCategory::General),
            "sos_medica" => DeviceStatus::Sos(SosCategory::Medica),
            "sos_seguridad" => DeviceStatus::Sos(SosCategory::Seguridad),
            _ => DeviceStatus::Unknown,
        }
    }

    /// Parse an optional wire status, treating absence as `Unknown`
    pub fn parse_opt(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or(DeviceStatus::Unknown)
    }

    /// Wire form of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Sos(category) => category.status_str(),
            DeviceStatus::Unknown => "unknown",
        }
    }

    /// Return the SOS category if this status is an emergency
    pub fn sos_category(&self) -> Option<SosCategory> {
        match self {
            DeviceStatus::Sos(category) => Some(*category),
            _ => None,
        }
    }
}

impl Default for DeviceStatus {
    fn default() -> Self {
        DeviceStatus::Unknown
    }
}
