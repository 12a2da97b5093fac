//! Device proof verification
//!
//! Device-originated writes carry a keyed-hash proof over the canonical
//! string `deviceId|ownerUid|timestamp|nonce`, computed with a shared
//! per-deployment secret. The comparison goes through `blake3::Hash`
//! equality, which is constant-time.

use thiserror::Error;

/// Proof configuration errors
#[derive(Debug, Error)]
pub enum ProofError {
    /// Secret is not valid hex or has the wrong length
    #[error("Invalid proof secret: expected 32 hex-encoded bytes")]
    InvalidSecret,
}

/// Verifier for device-originated write proofs
#[derive(Clone)]
pub struct ProofVerifier {
    key: [u8; 32],
}

impl ProofVerifier {
    /// Build a verifier from a hex-encoded 32-byte shared secret
    pub fn from_hex(secret_hex: &str) -> Result<Self, ProofError> {
        let bytes = hex::decode(secret_hex).map_err(|_| ProofError::InvalidSecret)?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| ProofError::InvalidSecret)?;
        Ok(Self { key })
    }

    /// Canonical string the proof is computed over
    fn canonical(device_id: &str, owner_uid: &str, timestamp: u64, nonce: &str) -> String {
        format!("{}|{}|{}|{}", device_id, owner_uid, timestamp, nonce)
    }

    /// Compute the expected proof for a request (used by tests and tooling)
    pub fn compute(&self, device_id: &str, owner_uid: &str, timestamp: u64, nonce: &str) -> String {
        let canonical = Self::canonical(device_id, owner_uid, timestamp, nonce);
        blake3::keyed_hash(&self.key, canonical.as_bytes())
            .to_hex()
            .to_string()
    }

    /// Verify a hex-encoded proof against the canonical request fields
    pub fn verify(
        &self,
        device_id: &str,
        owner_uid: &str,
        timestamp: u64,
        nonce: &str,
        proof_hex: &str,
    ) -> bool {
        let claimed: [u8; 32] = match hex::decode(proof_hex).map(|b| b.try_into()) {
            Ok(Ok(bytes)) => bytes,
            _ => return false,
        };
        let canonical = Self::canonical(device_id, owner_uid, timestamp, nonce);
        blake3::keyed_hash(&self.key, canonical.as_bytes()) == blake3::Hash::from(claimed)
    }
}
