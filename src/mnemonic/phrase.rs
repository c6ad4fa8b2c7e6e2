//! Wire form of mnemonic output and the mnemonic/raw-bytes classifier.
//!
//! Phrases are joined with single spaces, within and between blocks; there
//! is no header or separator beyond the words.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use zeroize::Zeroizing;

use super::chunk::{decode_secret, encode_secret};
use super::WORDS_PER_BLOCK;
use crate::error::MnemonicError;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z]{3,10}$").expect("word pattern is a valid regex"));

/// Join phrases into the space-separated wire form.
pub fn join_phrases<P, W>(phrases: &[P]) -> String
where
    P: AsRef<[W]>,
    W: AsRef<str>,
{
    phrases
        .iter()
        .flat_map(|p| p.as_ref().iter().map(AsRef::as_ref))
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Split wire-form text into phrases of `words_per_block` words.
///
/// Returns `None` unless [`looks_like_mnemonic`] accepts the text.
pub fn split_phrases(input: &str, words_per_block: usize) -> Option<Vec<Vec<&str>>> {
    if !looks_like_mnemonic(input.as_bytes(), words_per_block) {
        return None;
    }
    let tokens: Vec<&str> = input.split(' ').collect();
    Some(tokens.chunks(words_per_block).map(<[&str]>::to_vec).collect())
}

/// Heuristic: is `input` mnemonic text rather than raw secret bytes?
///
/// True iff splitting on single spaces yields a positive multiple of
/// `words_per_block` tokens, each three to ten lowercase ASCII letters.
/// Raw bytes that happen to look like lowercase words are misclassified.
pub fn looks_like_mnemonic(input: &[u8], words_per_block: usize) -> bool {
    let Ok(text) = std::str::from_utf8(input) else {
        return false;
    };
    if words_per_block == 0 {
        return false;
    }

    let mut count = 0usize;
    for token in text.split(' ') {
        if !WORD_PATTERN.is_match(token) {
            return false;
        }
        count += 1;
    }
    count % words_per_block == 0
}

/// Direction chosen by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encoded,
    Decoded,
}

/// Convert raw bytes to mnemonic text, or mnemonic text back to bytes.
///
/// The direction is picked by [`looks_like_mnemonic`] after dropping one
/// trailing line terminator; raw input is encoded untouched.
///
/// # Errors
///
/// Any [`MnemonicError`] when the input is classified as mnemonic text but
/// does not decode.
pub fn convert(input: &[u8], pad: u8) -> Result<(Direction, Zeroizing<Vec<u8>>), MnemonicError> {
    let text = strip_line_ending(input);

    if let Some(phrases) = std::str::from_utf8(text)
        .ok()
        .and_then(|t| split_phrases(t, WORDS_PER_BLOCK))
    {
        debug!(blocks = phrases.len(), "decoding mnemonic input");
        let secret = decode_secret(&phrases, pad)?;
        return Ok((Direction::Decoded, secret));
    }

    let phrases = encode_secret(input, pad);
    debug!(bytes = input.len(), blocks = phrases.len(), "encoding raw input");
    let wire = join_phrases(&phrases);
    Ok((Direction::Encoded, Zeroizing::new(wire.into_bytes())))
}

fn strip_line_ending(input: &[u8]) -> &[u8] {
    input
        .strip_suffix(b"\r\n")
        .or_else(|| input.strip_suffix(b"\n"))
        .unwrap_or(input)
}
