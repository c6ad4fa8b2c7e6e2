//! Keystore engine: passphrase-based sealing of arbitrary secrets into
//! EIP-2335 records.
//!
//! The derived key is split in two. Bytes `[0..16)` key the AES-128-CTR
//! cipher and bytes `[16..32)` key the SHA-256 checksum, which is verified
//! before any plaintext is produced.

use zeroize::Zeroizing;

use crate::crypto::{self, DKLEN, KdfParams};
use crate::error::KeystoreError;
use crate::format::KeystoreRecord;

impl KeystoreRecord {
    /// Encrypt `secret` under `passphrase` with a fresh salt and IV.
    ///
    /// # Errors
    ///
    /// [`KeystoreError::Kdf`] if `kdf` is out of range,
    /// [`KeystoreError::Random`] if the OS RNG is unavailable.
    pub fn encrypt(
        secret: &[u8],
        passphrase: &[u8],
        kdf: &KdfParams,
    ) -> Result<Self, KeystoreError> {
        let salt = crypto::generate_salt()?;
        let iv = crypto::generate_iv()?;

        let derived_key = crypto::derive_key(passphrase, &salt, kdf, DKLEN)?;
        let ciphertext = crypto::apply_keystream(&derived_key, &iv, secret)?;
        let checksum = crypto::compute_checksum(&derived_key, &ciphertext)?;

        Ok(Self::new(kdf, DKLEN, &salt, &iv, &ciphertext, &checksum))
    }

    /// Verify the record against `passphrase` and return the secret.
    ///
    /// Nothing is decrypted unless the checksum matches.
    ///
    /// # Errors
    ///
    /// [`KeystoreError::Encoding`] for malformed fields,
    /// [`KeystoreError::Kdf`] for invalid embedded KDF parameters and
    /// [`KeystoreError::Integrity`] for a wrong passphrase or tampered record.
    pub fn decrypt(&self, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        let record = self.decode()?;

        let derived_key = crypto::derive_key(passphrase, &record.salt, &record.kdf, record.dklen)?;
        crypto::verify_checksum(&derived_key, &record.ciphertext, &record.checksum)?;

        let secret = crypto::apply_keystream(&derived_key, &record.iv, &record.ciphertext)?;
        Ok(Zeroizing::new(secret))
    }
}
