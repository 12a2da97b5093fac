//! Contact resolution
//!
//! Resolves a device's emergency-contact list into delivery targets by
//! looking up each contact's user record and attaching its current
//! delivery tokens. Order-preserving; a failed lookup never aborts the
//! batch, it just marks that target as unresolvable.

#![warn(missing_docs)]

use crate::store::DocumentStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;
use vigil_domain::EmergencyContact;

/// Fallback display name for contacts configured without one
pub const DEFAULT_CONTACT_NAME: &str = "Contacto";

/// One emergency contact resolved to its delivery channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Contact UID
    pub contact_uid: String,
    /// Display name (device-configured, falling back to the user record)
    pub display_name: String,
    /// Current delivery tokens; empty when none are registered
    pub tokens: Vec<String>,
    /// Whether the contact's user record was found
    pub found: bool,
}

impl ResolvedTarget {
    /// The contact has at least one delivery channel to attempt
    pub fn has_tokens(&self) -> bool {
        self.found && !self.tokens.is_empty()
    }
}

/// Resolver over the user store
pub struct ContactResolver<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> ContactResolver<S> {
    /// Create a resolver backed by the given store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve every contact in input order
    ///
    /// Duplicate contact UIDs are passed through unduplicated (each entry
    /// produces its own target); a warning is logged because duplicate
    /// deliveries indicate misconfigured upstream data.
    pub async fn resolve(&self, contacts: &[EmergencyContact]) -> Vec<ResolvedTarget> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut targets = Vec::with_capacity(contacts.len());

        for contact in contacts {
            if !seen.insert(contact.contact_uid.as_str()) {
                warn!(
                    contact_uid = %contact.contact_uid,
                    "Duplicate emergency contact in device list"
                );
            }

            let target = match self.store.get_user(&contact.contact_uid).await {
                Ok(Some(user)) => {
                    let display_name = if !contact.display_name.is_empty() {
                        contact.display_name.clone()
                    } else if !user.name.is_empty() {
                        user.name.clone()
                    } else {
                        DEFAULT_CONTACT_NAME.to_string()
                    };
                    ResolvedTarget {
                        contact_uid: contact.contact_uid.clone(),
                        display_name,
                        tokens: user.delivery_tokens,
                        found: true,
                    }
                }
                Ok(None) => {
                    warn!(contact_uid = %contact.contact_uid, "Emergency contact not found");
                    ResolvedTarget {
                        contact_uid: contact.contact_uid.clone(),
                        display_name: self.fallback_name(contact),
                        tokens: Vec::new(),
                        found: false,
                    }
                }
                Err(e) => {
                    warn!(
                        contact_uid = %contact.contact_uid,
                        error = %e,
                        "Contact lookup failed"
                    );
                    ResolvedTarget {
                        contact_uid: contact.contact_uid.clone(),
                        display_name: self.fallback_name(contact),
                        tokens: Vec::new(),
                        found: false,
                    }
                }
            };
            targets.push(target);
        }

        targets
    }

    fn fallback_name(&self, contact: &EmergencyContact) -> String {
        if contact.display_name.is_empty() {
            DEFAULT_CONTACT_NAME.to_string()
        } else {
            contact.display_name.clone()
        }
    }
}
