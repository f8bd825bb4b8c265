use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    error::{Error, Result},
    model::{
        common::{
            ballot::{Ballot, BallotNumber, BallotStatus},
            candidate::{Candidate, CandidateTotal},
            national_id::NationalId,
            voter::VoterStatus,
        },
        db::{BallotRecord, BallotState, VotingStore},
    },
    privacy::{redact, BallotNumberGenerator, IdentityObfuscator},
};

/// Give up on issuing after this many ballot number collisions in a row.
const MAX_ISSUE_ATTEMPTS: usize = 8;

/// Ballot issuance, counting and reporting.
///
/// Every operation that reads then writes holds the store's write lock for
/// the whole sequence, so two concurrent attempts by the same voter can never
/// both be counted.
#[derive(Clone)]
pub struct Balloting {
    store: Arc<VotingStore>,
    obfuscator: Arc<IdentityObfuscator>,
    ballot_numbers: BallotNumberGenerator,
}

impl Balloting {
    pub fn new(
        store: Arc<VotingStore>,
        obfuscator: Arc<IdentityObfuscator>,
        ballot_numbers: BallotNumberGenerator,
    ) -> Self {
        Self {
            store,
            obfuscator,
            ballot_numbers,
        }
    }

    /// Issue a fresh ballot, or `None` if the voter is not registered.
    ///
    /// Voters may hold any number of ballots; only one of them can ever be
    /// counted.
    pub fn issue_ballot(&self, voter_national_id: &str) -> Result<Option<BallotNumber>> {
        let national_id = NationalId::new(voter_national_id);
        let mut tables = self.store.write();
        let Some(voter) = tables.voter(&national_id) else {
            return Ok(None);
        };
        let masked_id = voter.minimal.obfuscated_national_id.clone();

        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let ballot_number = self.ballot_numbers.generate();
            match tables.add_ballot(ballot_number.clone(), national_id.clone()) {
                Ok(()) => {
                    info!("Issued a ballot to voter {masked_id}");
                    return Ok(Some(ballot_number));
                }
                Err(Error::AlreadyExists(_)) => debug!("Ballot number collision, retrying"),
                Err(e) => return Err(e),
            }
        }
        Err(Error::Crypto(
            "could not generate an unused ballot number".to_string(),
        ))
    }

    /// Attempt to count a ballot on behalf of a voter.
    ///
    /// Checks run in a fixed order and the first failure wins: registration,
    /// ownership, validity, then fraud. A voter with a counted ballot who
    /// tries again is marked as a fraudster and the ballot they presented is
    /// invalidated, but nothing already counted is removed.
    pub fn count_ballot(&self, ballot: &Ballot, voter_national_id: &str) -> Result<BallotStatus> {
        let national_id = NationalId::new(voter_national_id);
        let ballot_number = &ballot.ballot_number;
        let mut tables = self.store.write();

        let Some(voter) = tables.voter(&national_id).cloned() else {
            return Ok(BallotStatus::VoterNotRegistered);
        };
        let masked_id = &voter.minimal.obfuscated_national_id;

        if !tables.ballot_belongs_to(ballot_number, &national_id) {
            return Ok(BallotStatus::VoterBallotMismatch);
        }
        if !tables.ballot_is_valid(ballot_number) {
            return Ok(BallotStatus::InvalidBallot);
        }

        if tables.counted_ballots(&national_id) > 0 {
            tables.set_voter_status(&national_id, VoterStatus::FraudCommitted)?;
            let presented_was_counted = tables
                .ballot(ballot_number)
                .map_or(false, BallotRecord::is_counted);
            if !presented_was_counted {
                tables.invalidate_ballot(ballot_number)?;
            }
            warn!("Voter {masked_id} tried to have a second ballot counted");
            return Ok(BallotStatus::FraudCommitted);
        }

        if let Some(candidate_id) = ballot.chosen_candidate_id {
            if tables.candidate(candidate_id).is_none() {
                debug!("Ballot names unknown candidate {candidate_id}");
                return Ok(BallotStatus::InvalidBallot);
            }
        }

        let first_name = self
            .obfuscator
            .decrypt_name(&voter.minimal.obfuscated_first_name)?;
        let last_name = self
            .obfuscator
            .decrypt_name(&voter.minimal.obfuscated_last_name)?;
        let comments = redact(&ballot.voter_comments, &first_name, &last_name)?;

        tables.record_vote(ballot_number, ballot.chosen_candidate_id, comments)?;
        tables.set_voter_status(&national_id, VoterStatus::BallotCounted)?;
        info!("Counted a ballot for voter {masked_id}");
        Ok(BallotStatus::BallotCounted)
    }

    /// Invalidate an issued ballot, e.g. one reported lost.
    ///
    /// False for unknown ballots, ballots already invalidated and ballots
    /// already counted.
    pub fn invalidate_ballot(&self, ballot_number: &BallotNumber) -> bool {
        match self.store.write().invalidate_ballot(ballot_number) {
            Ok(invalidated) => invalidated,
            Err(e) => {
                debug!("Could not invalidate ballot: {e}");
                false
            }
        }
    }

    /// Whether the ballot was issued to this voter and can still be counted.
    pub fn verify_ballot(&self, voter_national_id: &str, ballot_number: &BallotNumber) -> bool {
        let national_id = NationalId::new(voter_national_id);
        self.store
            .read()
            .ballot(ballot_number)
            .map_or(false, |ballot| {
                ballot.owner == national_id && ballot.state == BallotState::Issued
            })
    }

    /// Redacted comments of counted ballots, deduplicated.
    pub fn get_all_ballot_comments(&self) -> BTreeSet<String> {
        self.store.read().ballot_comments()
    }

    /// Candidates with their tallies, most votes first. Ties keep
    /// registration order.
    pub fn vote_totals(&self) -> Vec<CandidateTotal> {
        self.store.read().vote_totals()
    }

    /// The plurality winner, or `None` if nobody has a vote yet. A tie goes
    /// to the earliest registered of the tied candidates.
    pub fn compute_election_winner(&self) -> Option<Candidate> {
        self.vote_totals()
            .into_iter()
            .find(|total| total.votes > 0)
            .map(|total| total.candidate)
    }

    /// Names of every voter marked as a fraudster, as "First Last".
    pub fn get_all_fraudulent_voters(&self) -> Result<BTreeSet<String>> {
        let tables = self.store.read();
        tables
            .fraudulent_voters()
            .map(|record| {
                let first = self
                    .obfuscator
                    .decrypt_name(&record.minimal.obfuscated_first_name)?;
                let last = self
                    .obfuscator
                    .decrypt_name(&record.minimal.obfuscated_last_name)?;
                Ok(format!("{first} {last}"))
            })
            .collect()
    }

    pub fn get_all_candidates(&self) -> Vec<Candidate> {
        self.store.read().candidates().to_vec()
    }
}
