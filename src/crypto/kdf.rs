use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::DKLEN;
use crate::error::KeystoreError;

/// Largest derived key length the scrypt primitive accepts.
const MAX_DKLEN: usize = 64;

/// Ceiling on scrypt's working memory (`128 * r * n` bytes), 2 GiB.
pub const MAX_SCRYPT_MEMORY: u64 = 2 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    n: u32,
    r: u32,
    p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            // 2^18, the EIP-2335 recommended cost
            n: 262_144,
            r: 8,
            p: 1,
        }
    }
}

impl ScryptParams {
    pub fn new(n: u32, r: u32, p: u32) -> Result<Self, KeystoreError> {
        let params = Self { n, r, p };
        params.validate()?;
        Ok(params)
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn r(&self) -> u32 {
        self.r
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    pub fn validate(&self) -> Result<(), KeystoreError> {
        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(KeystoreError::Kdf(
                "scrypt n must be a power of two greater than 1".into(),
            ));
        }
        if self.r == 0 {
            return Err(KeystoreError::Kdf("scrypt r must be >= 1".into()));
        }
        if self.p == 0 {
            return Err(KeystoreError::Kdf("scrypt p must be >= 1".into()));
        }
        let memory = 128u64
            .saturating_mul(u64::from(self.r))
            .saturating_mul(u64::from(self.n));
        if memory > MAX_SCRYPT_MEMORY {
            return Err(KeystoreError::Kdf(format!(
                "scrypt n and r need {memory} bytes, above the {MAX_SCRYPT_MEMORY} byte limit"
            )));
        }
        Ok(())
    }

    fn log_n(&self) -> u8 {
        // n is a power of two, so this is exact and below 32
        self.n.trailing_zeros() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Params {
    c: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self { c: 262_144 }
    }
}

impl Pbkdf2Params {
    pub fn new(c: u32) -> Result<Self, KeystoreError> {
        let params = Self { c };
        params.validate()?;
        Ok(params)
    }

    pub fn c(&self) -> u32 {
        self.c
    }

    pub fn validate(&self) -> Result<(), KeystoreError> {
        if self.c == 0 {
            return Err(KeystoreError::Kdf("pbkdf2 iteration count must be >= 1".into()));
        }
        Ok(())
    }
}

/// Key derivation scheme and its work factor.
///
/// Passed explicitly into every encryption; the default is scrypt with the
/// EIP-2335 recommended cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfParams {
    Scrypt(ScryptParams),
    Pbkdf2(Pbkdf2Params),
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfParams::Scrypt(ScryptParams::default())
    }
}

impl KdfParams {
    /// Identifier stored in the record's `kdf.function` field.
    pub fn function(&self) -> &'static str {
        match self {
            KdfParams::Scrypt(_) => "scrypt",
            KdfParams::Pbkdf2(_) => "pbkdf2",
        }
    }

    pub fn validate(&self) -> Result<(), KeystoreError> {
        match self {
            KdfParams::Scrypt(p) => p.validate(),
            KdfParams::Pbkdf2(p) => p.validate(),
        }
    }
}

/// Derive `dklen` bytes of key material from `passphrase` and `salt`.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    kdf: &KdfParams,
    dklen: usize,
) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
    kdf.validate()?;
    if !(DKLEN..=MAX_DKLEN).contains(&dklen) {
        return Err(KeystoreError::Kdf(format!(
            "dklen must be between {DKLEN} and {MAX_DKLEN}, got {dklen}"
        )));
    }

    let mut key = Zeroizing::new(vec![0u8; dklen]);

    match kdf {
        KdfParams::Scrypt(params) => {
            let params = scrypt::Params::new(params.log_n(), params.r, params.p, dklen)
                .map_err(|e| KeystoreError::Kdf(format!("scrypt rejected parameters: {e}")))?;
            scrypt::scrypt(passphrase, salt, &params, &mut key)
                .map_err(|e| KeystoreError::Kdf(format!("scrypt key derivation failed: {e}")))?;
        }
        KdfParams::Pbkdf2(params) => {
            pbkdf2_hmac::<Sha256>(passphrase, salt, params.c, &mut key);
        }
    }

    Ok(key)
}
