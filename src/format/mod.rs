//! Serialized form of keystore records.
//!
//! A record is the EIP-2335 `crypto` object. It is stored either bare, the
//! way the keystore v4 encryptor emits it, or wrapped in a full EIP-2335
//! keystore document (see [`envelope`]). [`parse`] accepts both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{CHECKSUM_LEN, IV_LEN, KdfParams, Pbkdf2Params, ScryptParams};
use crate::error::KeystoreError;

pub mod envelope;

pub use envelope::{Envelope, KEYSTORE_VERSION};

pub const CIPHER_FUNCTION: &str = "aes-128-ctr";
pub const CHECKSUM_FUNCTION: &str = "sha256";
pub const PBKDF2_PRF: &str = "hmac-sha256";

/// An encrypted, checksummed, self-describing secret.
///
/// Constructed once by [`KeystoreRecord::encrypt`](crate::KeystoreRecord::encrypt)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreRecord {
    pub kdf: KdfModule,
    pub checksum: ChecksumModule,
    pub cipher: CipherModule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfModule {
    pub function: String,
    pub params: KdfParamsRecord,
    #[serde(default)]
    pub message: String,
}

/// `kdf.params` as it appears on the wire. Variants are told apart by
/// their field sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KdfParamsRecord {
    Scrypt {
        dklen: u32,
        n: u32,
        p: u32,
        r: u32,
        salt: String,
    },
    Pbkdf2 {
        dklen: u32,
        c: u32,
        prf: String,
        salt: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumModule {
    pub function: String,
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherModule {
    pub function: String,
    pub params: CipherParams,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

/// Record fields after validation, decoded from hex.
pub(crate) struct DecodedRecord {
    pub kdf: KdfParams,
    pub dklen: usize,
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub checksum: Vec<u8>,
}

impl KeystoreRecord {
    pub(crate) fn new(
        kdf: &KdfParams,
        dklen: usize,
        salt: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        checksum: &[u8],
    ) -> Self {
        let salt = hex::encode(salt);
        let params = match kdf {
            KdfParams::Scrypt(p) => KdfParamsRecord::Scrypt {
                dklen: dklen as u32,
                n: p.n(),
                p: p.p(),
                r: p.r(),
                salt,
            },
            KdfParams::Pbkdf2(p) => KdfParamsRecord::Pbkdf2 {
                dklen: dklen as u32,
                c: p.c(),
                prf: PBKDF2_PRF.to_string(),
                salt,
            },
        };

        Self {
            kdf: KdfModule {
                function: kdf.function().to_string(),
                params,
                message: String::new(),
            },
            checksum: ChecksumModule {
                function: CHECKSUM_FUNCTION.to_string(),
                params: serde_json::Map::new(),
                message: hex::encode(checksum),
            },
            cipher: CipherModule {
                function: CIPHER_FUNCTION.to_string(),
                params: CipherParams {
                    iv: hex::encode(iv),
                },
                message: hex::encode(ciphertext),
            },
        }
    }

    /// Check identifiers and field shapes and decode all byte fields.
    ///
    /// Structural problems are [`KeystoreError::Encoding`]; KDF parameters
    /// outside the algorithm's range are [`KeystoreError::Kdf`].
    pub(crate) fn decode(&self) -> Result<DecodedRecord, KeystoreError> {
        let (kdf, dklen, salt) = match (self.kdf.function.as_str(), &self.kdf.params) {
            ("scrypt", KdfParamsRecord::Scrypt { dklen, n, p, r, salt }) => {
                (KdfParams::Scrypt(ScryptParams::new(*n, *r, *p)?), *dklen, salt)
            }
            ("pbkdf2", KdfParamsRecord::Pbkdf2 { dklen, c, prf, salt }) => {
                if prf != PBKDF2_PRF {
                    return Err(KeystoreError::Encoding(format!(
                        "unsupported pbkdf2 prf: {prf}"
                    )));
                }
                (KdfParams::Pbkdf2(Pbkdf2Params::new(*c)?), *dklen, salt)
            }
            ("scrypt" | "pbkdf2", _) => {
                return Err(KeystoreError::Encoding(format!(
                    "kdf params do not match function {}",
                    self.kdf.function
                )));
            }
            (other, _) => {
                return Err(KeystoreError::Encoding(format!(
                    "unsupported kdf function: {other}"
                )));
            }
        };

        if self.cipher.function != CIPHER_FUNCTION {
            return Err(KeystoreError::Encoding(format!(
                "unsupported cipher function: {}",
                self.cipher.function
            )));
        }
        if self.checksum.function != CHECKSUM_FUNCTION {
            return Err(KeystoreError::Encoding(format!(
                "unsupported checksum function: {}",
                self.checksum.function
            )));
        }

        let salt = decode_hex("kdf salt", salt)?;
        let iv = decode_hex("cipher iv", &self.cipher.params.iv)?;
        let ciphertext = decode_hex("cipher message", &self.cipher.message)?;
        let checksum = decode_hex("checksum message", &self.checksum.message)?;

        if iv.len() != IV_LEN {
            return Err(KeystoreError::Encoding(format!(
                "cipher iv must be {IV_LEN} bytes, got {}",
                iv.len()
            )));
        }
        if checksum.len() != CHECKSUM_LEN {
            return Err(KeystoreError::Encoding(format!(
                "checksum must be {CHECKSUM_LEN} bytes, got {}",
                checksum.len()
            )));
        }

        Ok(DecodedRecord {
            kdf,
            dklen: dklen as usize,
            salt,
            iv,
            ciphertext,
            checksum,
        })
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, KeystoreError> {
    hex::decode(value).map_err(|e| KeystoreError::Encoding(format!("invalid {field} hex: {e}")))
}

/// Parses a serialized record, bare or wrapped in an EIP-2335 envelope.
///
/// # Errors
///
/// Returns [`KeystoreError::Encoding`] if the input is not JSON, a field is
/// missing, or the envelope version is unsupported.
pub fn parse(data: &[u8]) -> Result<KeystoreRecord, KeystoreError> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| KeystoreError::Encoding(format!("invalid JSON: {e}")))?;

    if value.get("crypto").is_some() {
        let envelope: Envelope = serde_json::from_value(value)
            .map_err(|e| KeystoreError::Encoding(e.to_string()))?;
        if envelope.version != KEYSTORE_VERSION {
            return Err(KeystoreError::Encoding(format!(
                "unsupported keystore version: {}",
                envelope.version
            )));
        }
        return Ok(envelope.crypto);
    }

    serde_json::from_value(value).map_err(|e| KeystoreError::Encoding(e.to_string()))
}

/// Serializes a bare record as pretty-printed JSON.
pub fn serialize(record: &KeystoreRecord) -> Result<Vec<u8>, KeystoreError> {
    serde_json::to_vec_pretty(record).map_err(|e| KeystoreError::Encoding(e.to_string()))
}
