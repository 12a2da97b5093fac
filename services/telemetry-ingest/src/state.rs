use std::sync::Arc;
use vigil_alert::{FanoutCoordinator, MemoryStore, TransitionDetector};

use crate::auth::ProofVerifier;
use crate::config::Config;
use crate::push::LogOnlyPush;

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub coordinator: FanoutCoordinator<MemoryStore, LogOnlyPush>,
    pub verifier: Option<ProofVerifier>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(LogOnlyPush);
        let coordinator = FanoutCoordinator::with_detector(
            Arc::clone(&store),
            push,
            TransitionDetector::with_cooldown(config.cooldown_ms),
        );

        let verifier = match &config.device_proof_secret {
            Some(secret) => Some(ProofVerifier::from_hex(secret)?),
            None => None,
        };

        Ok(AppState {
            store,
            coordinator,
            verifier,
        })
    }
}
