//! Dedup keys for the inventory.
//!
//! ```text
//! SHA-256(canonical_json_bytes) -> 32 bytes -> 64 lowercase hex chars
//! ```
//!
//! The digest is taken over the exact bytes of [`Joke::canonical_json`], with
//! no version prefix, so a fingerprint matches what any other producer of the
//! same canonical JSON computes with a plain SHA-256.
//!
//! [`Joke::canonical_json`]: crate::Joke::canonical_json

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::InventoryError;

/// Length of a fingerprint rendered as hex.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Full-width SHA-256 digest of a joke's canonical form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash canonical bytes. Callers are expected to pass
    /// [`Joke::canonical_json`](crate::Joke::canonical_json) output.
    pub fn of_canonical(canonical_bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_bytes);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(raw: &str) -> Result<Self, InventoryError> {
        if raw.len() != FINGERPRINT_HEX_LEN {
            return Err(InventoryError::Corrupt(format!(
                "fingerprint must be {FINGERPRINT_HEX_LEN} hex chars, got {}",
                raw.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(raw, &mut bytes)
            .map_err(|e| InventoryError::Corrupt(format!("fingerprint is not hex: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl FromStr for Fingerprint {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
