use std::collections::HashMap;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use data_encoding::BASE64;
use hmac::Mac;
use parking_lot::Mutex;
use rand::RngCore;

use crate::{
    error::{Error, Result},
    model::common::{
        national_id::NationalId,
        voter::{MinimalVoter, Voter},
    },
};

use super::{HmacSecret, HmacSha256, NameKey, Secrets};

/// Mask returned for IDs too short to reveal any characters of.
pub const SHORT_ID_MASK: &str = "*****";

/// Shortest canonical ID that gets its boundary characters revealed.
const MIN_REVEALING_LEN: usize = 5;

/// Bytes of HMAC output kept in the mask tag (two letters per byte).
const TAG_BYTES: usize = 4;

const MASK_DOMAIN: &[u8] = b"national-id-mask:";

const NONCE_LEN: usize = 12;

/// Deterministic, non-invertible national ID masking.
///
/// Output is `<tag>:<first>***<last>`. The tag is a keyed hash of the whole
/// canonical ID written with the letters `a`..=`p`, which keeps the mask a
/// stable join key while destroying any ordering inherited from the input.
#[derive(Debug, Clone)]
pub struct IdMasker {
    secret: HmacSecret,
}

impl IdMasker {
    pub fn new(secret: HmacSecret) -> Self {
        Self { secret }
    }

    pub fn mask(&self, national_id: &NationalId) -> String {
        let id = national_id.as_str();
        let chars: Vec<char> = id.chars().collect();
        if chars.len() < MIN_REVEALING_LEN {
            return SHORT_ID_MASK.to_string();
        }

        let mut hmac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        hmac.update(MASK_DOMAIN);
        hmac.update(id.as_bytes());
        let digest = hmac.finalize().into_bytes();

        let mut masked = String::with_capacity(TAG_BYTES * 2 + 6);
        for byte in &digest[..TAG_BYTES] {
            masked.push(char::from(b'a' + (byte >> 4)));
            masked.push(char::from(b'a' + (byte & 0x0f)));
        }
        masked.push(':');
        masked.push(chars[0]);
        masked.push_str("***");
        masked.push(chars[chars.len() - 1]);
        masked
    }
}

/// Randomised, reversible name encryption.
///
/// Each call to [`NameCipher::encrypt`] draws a fresh nonce, so the same name
/// never yields the same handle twice. The nonce for every handle is kept in
/// an owned map; a handle from any other instance is unknown here.
pub struct NameCipher {
    cipher: Aes256Gcm,
    nonces: Mutex<HashMap<String, [u8; NONCE_LEN]>>,
}

impl NameCipher {
    pub fn new(key: &NameKey) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| Error::Config(format!("invalid name key: {e}")))?;
        Ok(Self {
            cipher,
            nonces: Mutex::new(HashMap::new()),
        })
    }

    pub fn encrypt(&self, name: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), name.as_bytes())
            .map_err(|e| Error::Crypto(format!("name encryption failed: {e}")))?;

        let handle = BASE64.encode(&ciphertext);
        self.nonces.lock().insert(handle.clone(), nonce);
        Ok(handle)
    }

    pub fn decrypt(&self, handle: &str) -> Result<String> {
        let nonce = *self.nonces.lock().get(handle).ok_or(Error::UnknownHandle)?;
        let ciphertext = BASE64.decode(handle.as_bytes())?;
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|e| Error::Crypto(format!("name decryption failed: {e}")))?;
        String::from_utf8(plaintext).map_err(|e| Error::Crypto(e.to_string()))
    }

    /// Make a handle permanently unopenable. Returns whether it was known.
    pub fn forget(&self, handle: &str) -> bool {
        self.nonces.lock().remove(handle).is_some()
    }

    /// Forget every handle issued so far.
    pub fn clear(&self) {
        self.nonces.lock().clear();
    }

    /// Number of handles this instance can open.
    pub fn len(&self) -> usize {
        self.nonces.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The identity obfuscation component: ID masking plus name encryption,
/// living exactly as long as the service instance that owns it.
pub struct IdentityObfuscator {
    masker: IdMasker,
    names: NameCipher,
}

impl IdentityObfuscator {
    pub fn new(secrets: &Secrets) -> Result<Self> {
        Ok(Self {
            masker: IdMasker::new(secrets.hmac_secret.clone()),
            names: NameCipher::new(&secrets.name_key)?,
        })
    }

    pub fn mask_national_id(&self, national_id: &NationalId) -> String {
        self.masker.mask(national_id)
    }

    pub fn encrypt_name(&self, name: &str) -> Result<String> {
        self.names.encrypt(name)
    }

    pub fn decrypt_name(&self, handle: &str) -> Result<String> {
        self.names.decrypt(handle)
    }

    /// Drop the name handles of a voter who is no longer registered.
    pub fn forget_names(&self, minimal: &MinimalVoter) {
        self.names.forget(&minimal.obfuscated_first_name);
        self.names.forget(&minimal.obfuscated_last_name);
    }

    pub fn forget_all_names(&self) {
        self.names.clear();
    }

    /// Number of name handles that can still be opened.
    pub fn open_name_handles(&self) -> usize {
        self.names.len()
    }

    /// Project a voter into its minimal form. Names are trimmed first.
    pub fn minimal_voter(&self, voter: &Voter) -> Result<MinimalVoter> {
        Ok(MinimalVoter {
            obfuscated_first_name: self.encrypt_name(voter.first_name.trim())?,
            obfuscated_last_name: self.encrypt_name(voter.last_name.trim())?,
            obfuscated_national_id: self.mask_national_id(&voter.canonical_id()),
        })
    }
}
