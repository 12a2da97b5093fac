//! Emergency transition detection
//!
//! A pure state machine over a device's status field. The caller supplies
//! before/after snapshots atomically; the detector only interprets them.
//! The cooldown compare is a best-effort debounce, not a linearizable
//! guard: two transitions racing before either stamp persists can both
//! fire.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use vigil_domain::{DeviceStatus, SosCategory};

/// Default minimum elapsed time between two fired transitions on one device
pub const DEFAULT_COOLDOWN_MS: u64 = 5000;

/// Why an update was ignored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Status value did not change (heartbeat refresh, re-write)
    Unchanged,
    /// New status is not an emergency (online/offline/recovery/unknown)
    NotSos,
    /// A fanout for this device completed within the cooldown window
    Cooldown,
}

/// Detector verdict for one observed update
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    /// A new emergency event; run the fanout for this category
    Fire(SosCategory),
    /// Not an emergency-worthy update
    Ignore(IgnoreReason),
}

impl Decision {
    /// Check if the decision fires a fanout
    pub fn is_fire(&self) -> bool {
        matches!(self, Decision::Fire(_))
    }
}

/// State machine deciding whether a status update is a new emergency event
#[derive(Debug, Clone)]
pub struct TransitionDetector {
    /// Cooldown window in milliseconds
    cooldown_ms: u64,
}

impl TransitionDetector {
    /// Create a detector with the default cooldown window
    pub fn new() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }

    /// Create a detector with a custom cooldown window
    pub fn with_cooldown(cooldown_ms: u64) -> Self {
        Self { cooldown_ms }
    }

    /// Decide whether an observed update constitutes a new emergency event
    ///
    /// Rules, in order:
    /// 1. Unchanged status → ignore
    /// 2. New status not in the SOS family → ignore
    /// 3. Inside the cooldown window since the last processed fanout → ignore
    /// 4. Otherwise → fire
    pub fn detect(
        &self,
        previous: DeviceStatus,
        new: DeviceStatus,
        last_processed_ms: u64,
        now_ms: u64,
    ) -> Decision {
        if previous == new {
            return Decision::Ignore(IgnoreReason::Unchanged);
        }

        let category = match new.sos_category() {
            Some(category) => category,
            None => return Decision::Ignore(IgnoreReason::NotSos),
        };

        if now_ms.saturating_sub(last_processed_ms) < self.cooldown_ms {
            return Decision::Ignore(IgnoreReason::Cooldown);
        }

        Decision::Fire(category)
    }
}

impl Default for TransitionDetector {
    fn default() -> Self {
        Self::new()
    }
}
