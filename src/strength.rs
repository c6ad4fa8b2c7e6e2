//! Advisory passphrase strength estimate.
//!
//! The score is printed before the confirmation prompt and never blocks
//! encryption.

use std::fmt;

/// Strength bucket on a 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PassphraseStrength {
    VeryWeak = 1,
    Weak = 2,
    Fair = 3,
    Good = 4,
    Excellent = 5,
}

impl PassphraseStrength {
    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl fmt::Display for PassphraseStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password strength={}/5, {}", self.score(), self.label())
    }
}

/// Scores `passphrase` from its length, character classes and whether it
/// reads like several words.
///
/// Non-UTF-8 input is scored on its byte length plus one symbol class.
pub fn estimate(passphrase: &[u8]) -> PassphraseStrength {
    let len = match std::str::from_utf8(passphrase) {
        Ok(s) => s.chars().count(),
        Err(_) => passphrase.len(),
    };
    if len < 6 {
        return PassphraseStrength::VeryWeak;
    }

    let mut points: u32 = 0;

    for threshold in [8, 12, 16, 24] {
        if len >= threshold {
            points += 1;
        }
    }

    let text = String::from_utf8_lossy(passphrase);
    let has_lower = text.chars().any(|c| c.is_lowercase());
    let has_upper = text.chars().any(|c| c.is_uppercase());
    if has_lower && has_upper {
        points += 1;
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        points += 1;
    }
    if text.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        points += 1;
    }
    if word_count(&text) >= 4 {
        points += 2;
    }

    match points {
        0..=1 => PassphraseStrength::Weak,
        2..=3 => PassphraseStrength::Fair,
        4..=5 => PassphraseStrength::Good,
        _ => PassphraseStrength::Excellent,
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().filter(|w| w.chars().count() >= 2).count()
}
