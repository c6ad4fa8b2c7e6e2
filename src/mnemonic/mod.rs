//! Mnemonic engine: byte-exact conversion between binary secrets and BIP-39
//! English word phrases.
//!
//! - [`encode_block`] / [`decode_block`]: one 32-byte block <-> 24 words
//! - [`encode_secret`] / [`decode_secret`]: any length, padded to whole blocks
//! - [`join_phrases`], [`split_phrases`], [`looks_like_mnemonic`]: the
//!   space-separated wire form and the direction heuristic

pub mod chunk;
pub mod codec;
pub mod phrase;
pub mod wordlist;

pub use chunk::{DEFAULT_PAD, decode_secret, encode_secret};
pub use codec::{decode_block, encode_block};
pub use phrase::{Direction, convert, join_phrases, looks_like_mnemonic, split_phrases};

/// Entropy bytes per phrase.
pub const BLOCK_LEN: usize = 32;
/// Words per phrase.
pub const WORDS_PER_BLOCK: usize = 24;
