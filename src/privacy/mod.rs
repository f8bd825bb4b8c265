//! Everything that stands between a voter's identity and their ballot.

use std::fmt::{Debug, Formatter};

use hmac::Hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

pub mod ballot_number;
pub mod obfuscation;
pub mod redaction;

pub use ballot_number::BallotNumberGenerator;
pub use obfuscation::{IdentityObfuscator, NameCipher, SHORT_ID_MASK};
pub use redaction::redact;

pub type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of the AES-256-GCM name key.
pub const NAME_KEY_LEN: usize = 32;

/// Key for the keyed one-way functions (ballot numbers, ID mask tags).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HmacSecret(Vec<u8>);

impl HmacSecret {
    /// Rejects empty key material rather than silently running unkeyed.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(Error::Config("`hmac_secret` must not be empty".to_string()));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for HmacSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacSecret(<redacted>)")
    }
}

/// Symmetric key for name encryption.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct NameKey([u8; NAME_KEY_LEN]);

impl NameKey {
    pub fn from_bytes(bytes: [u8; NAME_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Accepts exactly [`NAME_KEY_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; NAME_KEY_LEN] = bytes.try_into().map_err(|_| {
            Error::Config(format!(
                "`name_key` must decode to {NAME_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; NAME_KEY_LEN] {
        &self.0
    }
}

impl Debug for NameKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("NameKey(<redacted>)")
    }
}

/// All injected key material, validated.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub hmac_secret: HmacSecret,
    pub name_key: NameKey,
}

impl Secrets {
    /// Fresh random secrets. Only meaningful for tests and throwaway instances:
    /// names encrypted under one set can never be decrypted under another.
    pub fn random() -> Self {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        let mut hmac_secret = vec![0u8; 32];
        rng.fill_bytes(&mut hmac_secret);
        let mut name_key = [0u8; NAME_KEY_LEN];
        rng.fill_bytes(&mut name_key);
        Self {
            hmac_secret: HmacSecret(hmac_secret),
            name_key: NameKey(name_key),
        }
    }
}
