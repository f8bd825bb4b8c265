use std::sync::Arc;

use log::{info, warn};

use crate::{
    error::{Error, Result},
    model::{
        common::{
            candidate::Candidate,
            national_id::NationalId,
            voter::{MinimalVoter, Voter, VoterStatus},
        },
        db::{Tables, VotingStore},
    },
    privacy::IdentityObfuscator,
};

/// Voter and candidate registration.
///
/// Internal only: none of this is reachable over HTTP.
#[derive(Clone)]
pub struct Registry {
    store: Arc<VotingStore>,
    obfuscator: Arc<IdentityObfuscator>,
}

impl Registry {
    pub fn new(store: Arc<VotingStore>, obfuscator: Arc<IdentityObfuscator>) -> Self {
        Self { store, obfuscator }
    }

    /// Register a voter unless their canonical national ID is already known.
    ///
    /// Returns `Ok(false)` for a duplicate, without touching any state.
    /// Eligibility is not checked here.
    pub fn register_voter(&self, voter: &Voter) -> Result<bool> {
        let national_id = voter.canonical_id();
        let mut tables = self.store.write();
        if tables.voter(&national_id).is_some() {
            return Ok(false);
        }

        let minimal = self.obfuscator.minimal_voter(voter)?;
        let masked_id = minimal.obfuscated_national_id.clone();
        match tables.add_voter(national_id, minimal) {
            Ok(()) => {
                info!("Registered voter {masked_id}");
                Ok(true)
            }
            Err(Error::AlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn get_voter_status(&self, voter_national_id: &str) -> VoterStatus {
        self.store
            .read()
            .voter_status(&NationalId::new(voter_national_id))
    }

    /// Remove a voter at their request, and with them the ability to open
    /// their name handles. Fails for unknown voters and, on purpose, for
    /// voters who committed fraud: that record must survive.
    pub fn de_register_voter(&self, voter_national_id: &str) -> bool {
        let national_id = NationalId::new(voter_national_id);
        match self.store.write().delete_voter(&national_id) {
            Ok(record) => {
                self.obfuscator.forget_names(&record.minimal);
                info!("De-registered voter {}", record.minimal.obfuscated_national_id);
                true
            }
            Err(Error::InvalidState(reason)) => {
                warn!("Refused de-registration: {reason}");
                false
            }
            Err(_) => false,
        }
    }

    /// The stored, obfuscated view of a voter.
    pub fn minimal_voter(&self, voter_national_id: &str) -> Option<MinimalVoter> {
        self.store
            .read()
            .voter(&NationalId::new(voter_national_id))
            .map(|record| record.minimal.clone())
    }

    /// Candidates are not deduplicated by name.
    pub fn register_candidate(&self, candidate_name: &str) -> Candidate {
        let candidate = self.store.write().add_candidate(candidate_name);
        info!("Registered candidate {}", candidate.candidate_id);
        candidate
    }

    pub fn candidate_is_registered(&self, candidate: &Candidate) -> bool {
        self.store.read().candidate(candidate.candidate_id).is_some()
    }

    pub fn get_all_candidates(&self) -> Vec<Candidate> {
        self.store.read().candidates().to_vec()
    }

    /// Wipe the store and every name handle issued into it. Mostly for tests
    /// and election resets.
    pub fn reset(&self) {
        warn!("Resetting the voting store");
        let mut tables = self.store.write();
        *tables = Tables::default();
        self.obfuscator.forget_all_names();
    }
}
