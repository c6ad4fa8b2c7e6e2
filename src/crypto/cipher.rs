use aes::Aes128;
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use getrandom::fill;

use super::{CIPHER_KEY_LEN, IV_LEN, SALT_LEN};
use crate::error::KeystoreError;

type Aes128Ctr = Ctr128BE<Aes128>;

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<(), KeystoreError> {
    fill(buf).map_err(|_| KeystoreError::Random)
}

/// Generate salt
pub fn generate_salt() -> Result<[u8; SALT_LEN], KeystoreError> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Generate IV
pub fn generate_iv() -> Result<[u8; IV_LEN], KeystoreError> {
    let mut iv = [0u8; IV_LEN];
    secure_random(&mut iv)?;
    Ok(iv)
}

/// Run AES-128-CTR over `data`. Encryption and decryption are the same
/// operation; the output has the same length as the input.
///
/// Only the first 16 bytes of `key` are used.
pub fn apply_keystream(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, KeystoreError> {
    let key: &[u8; CIPHER_KEY_LEN] = key
        .get(..CIPHER_KEY_LEN)
        .and_then(|k| k.try_into().ok())
        .ok_or_else(|| {
            KeystoreError::Kdf(format!(
                "derived key must be at least {CIPHER_KEY_LEN} bytes"
            ))
        })?;
    let iv: &[u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| KeystoreError::Encoding(format!("iv must be {IV_LEN} bytes")))?;

    let mut cipher = Aes128Ctr::new(key.into(), iv.into());
    let mut out = data.to_vec();
    cipher.apply_keystream(&mut out);
    Ok(out)
}
