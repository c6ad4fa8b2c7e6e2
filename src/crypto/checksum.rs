use sha2::{Digest, Sha256};

use super::{CHECKSUM_LEN, CIPHER_KEY_LEN, DKLEN};
use crate::error::KeystoreError;

/// SHA-256 over `derived_key[16..32] || ciphertext`.
pub fn compute_checksum(
    derived_key: &[u8],
    ciphertext: &[u8],
) -> Result<[u8; CHECKSUM_LEN], KeystoreError> {
    let checksum_key = derived_key.get(CIPHER_KEY_LEN..DKLEN).ok_or_else(|| {
        KeystoreError::Kdf(format!("derived key must be at least {DKLEN} bytes"))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(checksum_key);
    hasher.update(ciphertext);
    Ok(hasher.finalize().into())
}

/// Recompute the checksum and compare it against `expected` without an
/// early exit.
pub fn verify_checksum(
    derived_key: &[u8],
    ciphertext: &[u8],
    expected: &[u8],
) -> Result<(), KeystoreError> {
    let computed = compute_checksum(derived_key, ciphertext)?;
    if constant_time_eq(&computed, expected) {
        Ok(())
    } else {
        Err(KeystoreError::Integrity)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_own_checksum() {
        let key = [0xAA; 32];
        let ciphertext = [0xBB; 40];

        let checksum = compute_checksum(&key, &ciphertext).unwrap();
        assert!(verify_checksum(&key, &ciphertext, &checksum).is_ok());
    }

    #[test]
    fn verify_rejects_any_flipped_bit() {
        let key = [0xAA; 32];
        let ciphertext = [0xBB; 8];
        let checksum = compute_checksum(&key, &ciphertext).unwrap();

        for i in 0..CHECKSUM_LEN * 8 {
            let mut tampered = checksum;
            tampered[i / 8] ^= 1 << (i % 8);
            assert!(matches!(
                verify_checksum(&key, &ciphertext, &tampered),
                Err(KeystoreError::Integrity)
            ));
        }
    }

    #[test]
    fn checksum_uses_second_half_of_key() {
        let ciphertext = [0xCC; 32];
        let mut k1 = [0xAA; 32];
        let mut k2 = [0xBB; 32];
        k1[16..].copy_from_slice(&[0xFF; 16]);
        k2[16..].copy_from_slice(&[0xFF; 16]);

        assert_eq!(
            compute_checksum(&k1, &ciphertext).unwrap(),
            compute_checksum(&k2, &ciphertext).unwrap()
        );

        k2[16..].copy_from_slice(&[0xEE; 16]);
        assert_ne!(
            compute_checksum(&k1, &ciphertext).unwrap(),
            compute_checksum(&k2, &ciphertext).unwrap()
        );
    }

    #[test]
    fn short_key_is_rejected() {
        assert!(compute_checksum(&[0u8; 31], b"x").is_err());
    }

    #[test]
    fn constant_time_eq_compares_length_and_content() {
        assert!(constant_time_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_eq(&[1, 2, 3], &[1, 2]));
    }
}
