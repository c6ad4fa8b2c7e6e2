//! Full EIP-2335 keystore document.
//!
//! ```text
//! { "crypto": {...}, "description": "", "pubkey": "", "path": "", "uuid": "...", "version": 4 }
//! ```
//!
//! The secret encrypted here is arbitrary, so `pubkey` and `path` are left
//! empty.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::KeystoreRecord;
use crate::error::KeystoreError;

/// Schema version written into every envelope.
pub const KEYSTORE_VERSION: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub crypto: KeystoreRecord,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pubkey: String,
    #[serde(default)]
    pub path: String,
    pub uuid: String,
    pub version: u32,
}

impl Envelope {
    /// Wraps `crypto` with a fresh random UUID.
    pub fn new(crypto: KeystoreRecord, description: Option<&str>) -> Self {
        Self {
            crypto,
            description: description.unwrap_or_default().to_string(),
            pubkey: String::new(),
            path: String::new(),
            uuid: Uuid::new_v4().to_string(),
            version: KEYSTORE_VERSION,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, KeystoreError> {
        serde_json::to_vec_pretty(self).map_err(|e| KeystoreError::Encoding(e.to_string()))
    }
}
