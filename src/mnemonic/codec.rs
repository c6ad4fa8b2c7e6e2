//! 32-byte entropy block <-> 24-word BIP-39 phrase.
//!
//! The block is followed by an 8-bit checksum (the first byte of its
//! SHA-256), giving 264 bits that split into 24 11-bit word indices.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::wordlist;
use super::{BLOCK_LEN, WORDS_PER_BLOCK};
use crate::error::MnemonicError;

const BITS_PER_WORD: usize = 11;
/// Entropy plus one checksum byte: 256 + 8 bits.
const STREAM_LEN: usize = BLOCK_LEN + 1;

fn checksum_byte(entropy: &[u8; BLOCK_LEN]) -> u8 {
    Sha256::digest(entropy)[0]
}

/// Encode one block into its 24 dictionary words.
pub fn encode_block(entropy: &[u8; BLOCK_LEN]) -> [&'static str; WORDS_PER_BLOCK] {
    let mut stream = Zeroizing::new([0u8; STREAM_LEN]);
    stream[..BLOCK_LEN].copy_from_slice(entropy);
    stream[BLOCK_LEN] = checksum_byte(entropy);

    let mut words = [""; WORDS_PER_BLOCK];
    for (i, slot) in words.iter_mut().enumerate() {
        let mut index = 0u16;
        for bit in i * BITS_PER_WORD..(i + 1) * BITS_PER_WORD {
            let value = (stream[bit / 8] >> (7 - bit % 8)) & 1;
            index = (index << 1) | u16::from(value);
        }
        *slot = wordlist::word(index);
    }
    words
}

/// Decode 24 words back into the entropy block, verifying the checksum.
///
/// # Errors
///
/// [`MnemonicError::WordCount`] unless exactly 24 words are given,
/// [`MnemonicError::UnknownWord`] for a word outside the dictionary and
/// [`MnemonicError::ChecksumMismatch`] if the embedded checksum is wrong.
pub fn decode_block<W: AsRef<str>>(
    words: &[W],
) -> Result<Zeroizing<[u8; BLOCK_LEN]>, MnemonicError> {
    if words.len() != WORDS_PER_BLOCK {
        return Err(MnemonicError::WordCount {
            expected: WORDS_PER_BLOCK,
            actual: words.len(),
        });
    }

    let mut stream = Zeroizing::new([0u8; STREAM_LEN]);
    for (i, word) in words.iter().enumerate() {
        let index = wordlist::index_of(word.as_ref())
            .ok_or(MnemonicError::UnknownWord { position: i })?;
        for b in 0..BITS_PER_WORD {
            if (index >> (BITS_PER_WORD - 1 - b)) & 1 == 1 {
                let bit = i * BITS_PER_WORD + b;
                stream[bit / 8] |= 1 << (7 - bit % 8);
            }
        }
    }

    let mut entropy = Zeroizing::new([0u8; BLOCK_LEN]);
    entropy.copy_from_slice(&stream[..BLOCK_LEN]);

    if checksum_byte(&entropy) != stream[BLOCK_LEN] {
        return Err(MnemonicError::ChecksumMismatch);
    }

    Ok(entropy)
}
