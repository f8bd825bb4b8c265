use data_encoding::BASE64URL_NOPAD;
use hmac::Mac;
use rand::RngCore;

use crate::model::common::ballot::BallotNumber;

use super::{HmacSecret, HmacSha256};

const BALLOT_DOMAIN: &[u8] = b"ballot-number:";

/// Bytes of fresh randomness fed into every ballot number.
const NONCE_LEN: usize = 32;

/// Issues ballot numbers that reveal neither their owner nor their issue order.
///
/// A ballot number is a keyed PRF over a per-call random nonce. The voter's
/// identity is not an input; the link from number to voter lives only in the
/// store's issuance record.
#[derive(Debug, Clone)]
pub struct BallotNumberGenerator {
    secret: HmacSecret,
}

impl BallotNumberGenerator {
    pub fn new(secret: HmacSecret) -> Self {
        Self { secret }
    }

    pub fn generate(&self) -> BallotNumber {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let mut hmac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        hmac.update(BALLOT_DOMAIN);
        hmac.update(&nonce);
        BASE64URL_NOPAD
            .encode(&hmac.finalize().into_bytes())
            .into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::privacy::Secrets;

    fn generator() -> BallotNumberGenerator {
        BallotNumberGenerator::new(Secrets::random().hmac_secret)
    }

    #[test]
    fn numbers_are_unique() {
        let generator = generator();
        let numbers: HashSet<_> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(numbers.len(), 1000);
    }

    #[test]
    fn numbers_are_url_safe() {
        let number = generator().generate();
        assert_eq!(number.as_str().len(), 43);
        assert!(number
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn issue_order_is_not_recoverable_by_sorting() {
        let generator = generator();
        let in_issue_order: Vec<_> = (0..10).map(|_| generator.generate()).collect();

        let mut ascending = in_issue_order.clone();
        ascending.sort();
        let mut descending = ascending.clone();
        descending.reverse();

        assert_ne!(in_issue_order, ascending);
        assert_ne!(in_issue_order, descending);
    }

    #[test]
    fn same_secret_does_not_repeat_numbers() {
        let secrets = Secrets::random();
        let a = BallotNumberGenerator::new(secrets.hmac_secret.clone());
        let b = BallotNumberGenerator::new(secrets.hmac_secret);
        assert_ne!(a.generate(), b.generate());
    }
}
