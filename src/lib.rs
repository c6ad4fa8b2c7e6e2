pub mod crypto;
pub mod error;
pub mod format;
mod keystore;
pub mod mnemonic;
mod storage;
pub mod strength;

pub use crate::crypto::{KdfParams, Pbkdf2Params, ScryptParams};
pub use crate::error::{KeystoreError, MnemonicError};
pub use crate::format::{Envelope, KeystoreRecord};
pub use crate::storage::Storage;
use anyhow::{Context, Result, bail};
use tracing::debug;
use zeroize::Zeroizing;

/// How [`encrypt_to_storage`] seals and lays out a keystore file.
#[derive(Debug, Clone, Default)]
pub struct EncryptOptions {
    pub kdf: KdfParams,
    /// Wrap the record in a full EIP-2335 document instead of writing it bare.
    pub envelope: bool,
    pub description: Option<String>,
}

/// Encrypts `secret` and writes the record to a new file.
///
/// Fails before deriving any key if the file already exists.
pub fn encrypt_to_storage(
    storage: &Storage,
    secret: &[u8],
    passphrase: &[u8],
    options: &EncryptOptions,
) -> Result<()> {
    if storage.exists() {
        bail!("file {} already exists", storage.path().display());
    }

    debug!(
        kdf = options.kdf.function(),
        secret_len = secret.len(),
        envelope = options.envelope,
        "encrypting secret"
    );
    let record = KeystoreRecord::encrypt(secret, passphrase, &options.kdf)
        .context("failed to encrypt secret")?;

    let data = if options.envelope {
        Envelope::new(record, options.description.as_deref()).to_json()?
    } else {
        format::serialize(&record)?
    };

    storage.create(&data)
}

/// Loads a keystore file, bare or enveloped, and decrypts it.
pub fn decrypt_from_storage(storage: &Storage, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if !storage.exists() {
        bail!("file {} does not exist", storage.path().display());
    }

    let data = storage.load()?;
    let record = format::parse(&data)
        .with_context(|| format!("failed to parse {}", storage.path().display()))?;
    debug!(kdf = %record.kdf.function, "decrypting secret");

    let secret = record.decrypt(passphrase)?;
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn cheap_options() -> EncryptOptions {
        EncryptOptions {
            kdf: KdfParams::Scrypt(ScryptParams::new(1024, 8, 1).unwrap()),
            ..EncryptOptions::default()
        }
    }

    #[test]
    fn encrypt_and_decrypt_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));

        encrypt_to_storage(&storage, b"this is a great secret", b"pw", &cheap_options()).unwrap();
        let secret = decrypt_from_storage(&storage, b"pw").unwrap();

        assert_eq!(secret.as_slice(), b"this is a great secret");
    }

    #[test]
    fn bare_record_is_written_by_default() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));
        encrypt_to_storage(&storage, b"s", b"pw", &cheap_options()).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&storage.load().unwrap()).unwrap();
        assert!(json.get("crypto").is_none());
        assert_eq!(json["kdf"]["function"], "scrypt");
        assert_eq!(json["cipher"]["function"], "aes-128-ctr");
    }

    #[test]
    fn envelope_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));
        let options = EncryptOptions {
            envelope: true,
            description: Some("backup".to_string()),
            ..cheap_options()
        };
        encrypt_to_storage(&storage, b"s3cret", b"pw", &options).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&storage.load().unwrap()).unwrap();
        assert_eq!(json["version"], 4);
        assert_eq!(json["description"], "backup");

        let secret = decrypt_from_storage(&storage, b"pw").unwrap();
        assert_eq!(secret.as_slice(), b"s3cret");
    }

    #[test]
    fn encrypt_fails_if_file_exists() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));
        encrypt_to_storage(&storage, b"first", b"pw", &cheap_options()).unwrap();

        assert!(encrypt_to_storage(&storage, b"second", b"pw", &cheap_options()).is_err());
        let secret = decrypt_from_storage(&storage, b"pw").unwrap();
        assert_eq!(secret.as_slice(), b"first");
    }

    #[test]
    fn wrong_passphrase_fails_with_integrity_error() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));
        encrypt_to_storage(&storage, b"s", b"correct", &cheap_options()).unwrap();

        let err = decrypt_from_storage(&storage, b"wrong").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeystoreError>(),
            Some(KeystoreError::Integrity)
        ));
    }

    #[test]
    fn decrypt_missing_file_fails() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("missing.json"));
        assert!(decrypt_from_storage(&storage, b"pw").is_err());
    }

    #[test]
    fn garbage_file_is_an_encoding_error() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("secret.json"));
        storage.create(b"not json").unwrap();

        let err = decrypt_from_storage(&storage, b"pw").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeystoreError>(),
            Some(KeystoreError::Encoding(_))
        ));
    }
}
