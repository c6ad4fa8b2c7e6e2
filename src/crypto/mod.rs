//! Cryptographic primitives for the keystore.
//!
//! Provides key derivation, the AES-128-CTR stream cipher and the
//! SHA-256 integrity checksum used by EIP-2335 records.

pub mod checksum;
pub mod cipher;
pub mod kdf;

pub use checksum::{compute_checksum, verify_checksum};
pub use cipher::{apply_keystream, generate_iv, generate_salt};
pub use kdf::{KdfParams, Pbkdf2Params, ScryptParams, derive_key};

/// Length of the KDF salt (32 bytes).
pub const SALT_LEN: usize = 32;
/// Length of the AES-128-CTR initialization vector (16 bytes).
pub const IV_LEN: usize = 16;
/// Length of the derived key (32 bytes / 256 bits).
pub const DKLEN: usize = 32;
/// Length of the cipher key half of the derived key.
pub const CIPHER_KEY_LEN: usize = 16;
/// Length of the SHA-256 checksum.
pub const CHECKSUM_LEN: usize = 32;
