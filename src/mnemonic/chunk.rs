//! Arbitrary-length secrets as a sequence of 24-word phrases.
//!
//! The secret is right-padded with a caller-chosen byte to a multiple of 32
//! and cut into blocks in order. Decoding strips every trailing pad byte, so
//! a secret that itself ends in the pad byte does not round-trip.

use zeroize::Zeroizing;

use super::codec::{decode_block, encode_block};
use super::{BLOCK_LEN, WORDS_PER_BLOCK};
use crate::error::MnemonicError;

/// Space, the conventional pad byte.
pub const DEFAULT_PAD: u8 = b' ';

/// Encode `secret` into `ceil(len / 32)` phrases of 24 words each.
pub fn encode_secret(secret: &[u8], pad: u8) -> Vec<[&'static str; WORDS_PER_BLOCK]> {
    secret
        .chunks(BLOCK_LEN)
        .map(|chunk| {
            let mut block = Zeroizing::new([pad; BLOCK_LEN]);
            block[..chunk.len()].copy_from_slice(chunk);
            encode_block(&block)
        })
        .collect()
}

/// Decode phrases in order and strip trailing `pad` bytes.
///
/// All-or-nothing: the first invalid phrase fails the whole call.
///
/// # Errors
///
/// Any [`MnemonicError`] from a block; word positions are counted across
/// the whole input.
pub fn decode_secret<P, W>(phrases: &[P], pad: u8) -> Result<Zeroizing<Vec<u8>>, MnemonicError>
where
    P: AsRef<[W]>,
    W: AsRef<str>,
{
    let mut secret = Zeroizing::new(Vec::with_capacity(phrases.len() * BLOCK_LEN));
    for (n, phrase) in phrases.iter().enumerate() {
        let block = decode_block(phrase.as_ref()).map_err(|e| match e {
            MnemonicError::UnknownWord { position } => MnemonicError::UnknownWord {
                position: n * WORDS_PER_BLOCK + position,
            },
            other => other,
        })?;
        secret.extend_from_slice(block.as_slice());
    }

    let kept = secret.iter().rposition(|&b| b != pad).map_or(0, |i| i + 1);
    secret.truncate(kept);
    Ok(secret)
}
