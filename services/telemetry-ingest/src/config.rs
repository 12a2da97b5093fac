use std::env;

/// Default ingress port
const DEFAULT_PORT: u16 = 8090;
/// Telemetry payload ceiling in bytes
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 5120;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Shared device-proof secret (32 bytes, hex). When unset, proof
    /// verification is disabled (development only).
    pub device_proof_secret: Option<String>,
    pub cooldown_ms: u64,
    pub max_payload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            device_proof_secret: env::var("DEVICE_PROOF_SECRET").ok().filter(|s| !s.is_empty()),
            cooldown_ms: env::var("SOS_COOLDOWN_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(vigil_alert::DEFAULT_COOLDOWN_MS),
            max_payload_bytes: env::var("MAX_PAYLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES),
        })
    }
}
