//! The two services the rest of the system talks to. Both are cheap to clone
//! and share one store and one identity obfuscator.

use std::sync::Arc;

use crate::{
    error::Result,
    model::db::VotingStore,
    privacy::{BallotNumberGenerator, IdentityObfuscator, Secrets},
};

mod balloting;
pub use balloting::Balloting;

mod registry;
pub use registry::Registry;

/// Build a fresh store and wire both services to it.
pub fn services(secrets: &Secrets) -> Result<(Registry, Balloting)> {
    let store = Arc::new(VotingStore::new());
    let obfuscator = Arc::new(IdentityObfuscator::new(secrets)?);
    let ballot_numbers = BallotNumberGenerator::new(secrets.hmac_secret.clone());

    let registry = Registry::new(store.clone(), obfuscator.clone());
    let balloting = Balloting::new(store, obfuscator, ballot_numbers);
    Ok((registry, balloting))
}
