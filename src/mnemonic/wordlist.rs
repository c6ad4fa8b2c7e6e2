//! BIP-39 English dictionary.
//!
//! Embedded at compile time and parsed once on first access. The table is
//! read-only afterwards and safe to share between threads.

use std::sync::OnceLock;

/// Number of words in the dictionary.
pub const WORDLIST_SIZE: usize = 2048;

const ENGLISH_RAW: &str = include_str!("english.txt");

static ENGLISH: OnceLock<Box<[&'static str]>> = OnceLock::new();

/// The 2048 English words, in index order.
pub fn words() -> &'static [&'static str] {
    ENGLISH.get_or_init(|| {
        let words: Vec<&'static str> = ENGLISH_RAW.lines().collect();
        debug_assert_eq!(words.len(), WORDLIST_SIZE);
        words.into_boxed_slice()
    })
}

/// Word for an 11-bit index.
pub fn word(index: u16) -> &'static str {
    words()[usize::from(index) % WORDLIST_SIZE]
}

/// Index of `word`, if it is in the dictionary.
///
/// The English list is sorted by byte order, so this is a binary search.
pub fn index_of(word: &str) -> Option<u16> {
    words()
        .binary_search_by(|probe| (*probe).cmp(word))
        .ok()
        .and_then(|i| u16::try_from(i).ok())
}
