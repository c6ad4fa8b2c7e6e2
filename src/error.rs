use thiserror::Error;

/// Errors produced while sealing or opening a keystore record.
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// Key derivation parameters are out of range for the algorithm.
    #[error("invalid key derivation parameters: {0}")]
    Kdf(String),

    /// Wrong passphrase or a corrupted/tampered record; the two are
    /// indistinguishable.
    #[error("integrity check failed")]
    Integrity,

    /// The serialized record is missing fields or carries invalid values.
    #[error("malformed keystore record: {0}")]
    Encoding(String),

    #[error("OS random generator unavailable")]
    Random,
}

/// Errors produced while decoding mnemonic phrases.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    /// Word at `position` (0-based, across the whole input) is not in the dictionary.
    #[error("unknown mnemonic word at position {position}")]
    UnknownWord { position: usize },

    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid mnemonic word count: expected {expected}, got {actual}")]
    WordCount { expected: usize, actual: usize },
}
