use std::collections::{BTreeSet, HashMap};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    error::{Error, Result},
    model::common::{
        ballot::BallotNumber,
        candidate::{Candidate, CandidateId, CandidateTotal},
        national_id::NationalId,
        voter::{MinimalVoter, VoterStatus},
    },
};

use super::{BallotRecord, BallotState, VoterRecord};

/// The single source of truth for candidates, voters and ballots.
///
/// Every operation lives on [`Tables`]; a caller takes [`VotingStore::read`]
/// or [`VotingStore::write`] and runs as many operations as it needs under
/// that one guard. A write guard is the unit of atomicity: nothing else can
/// observe the store between two operations performed through it.
#[derive(Default)]
pub struct VotingStore {
    tables: RwLock<Tables>,
}

impl VotingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access. Readers never see a half-applied write.
    pub fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read()
    }

    /// Exclusive access for a read-modify-write sequence.
    pub fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write()
    }

    /// Drop all data, returning the store to its freshly constructed state.
    pub fn reset(&self) {
        *self.tables.write() = Tables::default();
    }
}

/// The store's tables and the operations over them.
#[derive(Debug, Default)]
pub struct Tables {
    next_candidate_id: u64,
    /// In registration order.
    candidates: Vec<Candidate>,
    voters: HashMap<NationalId, VoterRecord>,
    ballots: HashMap<BallotNumber, BallotRecord>,
    /// Issuance index, so per-voter queries need not scan every ballot.
    ballots_by_voter: HashMap<NationalId, Vec<BallotNumber>>,
}

// Candidates.
impl Tables {
    pub fn add_candidate(&mut self, name: &str) -> Candidate {
        let candidate = Candidate {
            candidate_id: CandidateId::from_raw(self.next_candidate_id),
            name: name.to_string(),
        };
        self.next_candidate_id += 1;
        self.candidates.push(candidate.clone());
        candidate
    }

    pub fn candidate(&self, candidate_id: CandidateId) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|candidate| candidate.candidate_id == candidate_id)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

// Voters.
impl Tables {
    /// Insert a voter keyed by canonical ID. Never overwrites.
    pub fn add_voter(&mut self, national_id: NationalId, minimal: MinimalVoter) -> Result<()> {
        if self.voters.contains_key(&national_id) {
            return Err(Error::AlreadyExists(format!(
                "Voter {}",
                minimal.obfuscated_national_id
            )));
        }
        self.voters.insert(national_id, VoterRecord::new(minimal));
        Ok(())
    }

    pub fn voter(&self, national_id: &NationalId) -> Option<&VoterRecord> {
        self.voters.get(national_id)
    }

    /// An absent record means [`VoterStatus::NotRegistered`].
    pub fn voter_status(&self, national_id: &NationalId) -> VoterStatus {
        self.voter(national_id)
            .map(|voter| voter.status)
            .unwrap_or(VoterStatus::NotRegistered)
    }

    pub fn set_voter_status(&mut self, national_id: &NationalId, status: VoterStatus) -> Result<()> {
        let voter = self
            .voters
            .get_mut(national_id)
            .ok_or_else(|| Error::not_found("Voter"))?;
        voter.status = status;
        Ok(())
    }

    /// Remove a voter, refusing if they have committed fraud.
    ///
    /// Ballots are never removed. Any of the voter's ballots still waiting to
    /// be cast are invalidated so they cannot be revived by re-registering.
    pub fn delete_voter(&mut self, national_id: &NationalId) -> Result<VoterRecord> {
        match self.voter_status(national_id) {
            VoterStatus::NotRegistered => return Err(Error::not_found("Voter")),
            VoterStatus::FraudCommitted => {
                return Err(Error::invalid_state(
                    "Voters who committed fraud cannot be de-registered",
                ))
            }
            VoterStatus::RegisteredNotVoted | VoterStatus::BallotCounted => {}
        }

        for number in self.ballots_by_voter.get(national_id).into_iter().flatten() {
            if let Some(ballot) = self.ballots.get_mut(number) {
                if ballot.state == BallotState::Issued {
                    ballot.state = BallotState::Invalidated;
                }
            }
        }

        self.voters
            .remove(national_id)
            .ok_or_else(|| Error::not_found("Voter"))
    }

    pub fn fraudulent_voters(&self) -> impl Iterator<Item = &VoterRecord> {
        self.voters
            .values()
            .filter(|voter| voter.status == VoterStatus::FraudCommitted)
    }
}

// Ballots.
impl Tables {
    /// Record that `number` was issued to `owner`.
    pub fn add_ballot(&mut self, number: BallotNumber, owner: NationalId) -> Result<()> {
        if !self.voters.contains_key(&owner) {
            return Err(Error::not_found("Voter"));
        }
        if self.ballots.contains_key(&number) {
            return Err(Error::AlreadyExists("Ballot number".to_string()));
        }
        self.ballots_by_voter
            .entry(owner.clone())
            .or_default()
            .push(number.clone());
        self.ballots.insert(number, BallotRecord::issued_to(owner));
        Ok(())
    }

    pub fn ballot(&self, number: &BallotNumber) -> Option<&BallotRecord> {
        self.ballots.get(number)
    }

    /// Was `number` issued to this voter? False for unknown ballots.
    pub fn ballot_belongs_to(&self, number: &BallotNumber, national_id: &NationalId) -> bool {
        self.ballot(number)
            .map_or(false, |ballot| &ballot.owner == national_id)
    }

    /// Does the ballot exist and has it escaped invalidation?
    pub fn ballot_is_valid(&self, number: &BallotNumber) -> bool {
        self.ballot(number).map_or(false, BallotRecord::is_validated)
    }

    /// Ballots issued to this voter, in no particular order.
    pub fn ballots_of(&self, national_id: &NationalId) -> impl Iterator<Item = &BallotRecord> {
        self.ballots_by_voter
            .get(national_id)
            .into_iter()
            .flatten()
            .filter_map(|number| self.ballots.get(number))
    }

    /// How many of this voter's ballots have been counted. More than one is a
    /// broken invariant.
    pub fn counted_ballots(&self, national_id: &NationalId) -> usize {
        self.ballots_of(national_id)
            .filter(|ballot| ballot.is_counted())
            .count()
    }

    /// Permanently invalidate a ballot.
    ///
    /// Returns `Ok(true)` if this call invalidated it and `Ok(false)` if it was
    /// already invalid. A counted ballot can never be invalidated.
    pub fn invalidate_ballot(&mut self, number: &BallotNumber) -> Result<bool> {
        let ballot = self
            .ballots
            .get_mut(number)
            .ok_or_else(|| Error::not_found("Ballot"))?;
        match ballot.state {
            BallotState::Issued => {
                ballot.state = BallotState::Invalidated;
                Ok(true)
            }
            BallotState::Invalidated => Ok(false),
            BallotState::Counted => Err(Error::invalid_state(
                "A counted ballot cannot be invalidated",
            )),
        }
    }

    /// Mark an issued ballot as counted and store the choice with the
    /// already-redacted comment.
    pub fn record_vote(
        &mut self,
        number: &BallotNumber,
        chosen_candidate_id: Option<CandidateId>,
        redacted_comment: String,
    ) -> Result<()> {
        let ballot = self
            .ballots
            .get_mut(number)
            .ok_or_else(|| Error::not_found("Ballot"))?;
        if ballot.state != BallotState::Issued {
            return Err(Error::invalid_state(format!(
                "Cannot count a ballot in state {:?}",
                ballot.state
            )));
        }
        ballot.state = BallotState::Counted;
        ballot.chosen_candidate_id = chosen_candidate_id;
        ballot.voter_comments = redacted_comment;
        Ok(())
    }
}

// Aggregates.
impl Tables {
    /// Counted votes per candidate, most votes first. Candidates with equal
    /// counts keep registration order. Every candidate appears, even on zero.
    pub fn vote_totals(&self) -> Vec<CandidateTotal> {
        let mut votes: HashMap<CandidateId, u64> = HashMap::new();
        for ballot in self.ballots.values().filter(|ballot| ballot.is_counted()) {
            if let Some(candidate_id) = ballot.chosen_candidate_id {
                *votes.entry(candidate_id).or_default() += 1;
            }
        }

        let mut totals: Vec<CandidateTotal> = self
            .candidates
            .iter()
            .map(|candidate| CandidateTotal {
                candidate: candidate.clone(),
                votes: votes.get(&candidate.candidate_id).copied().unwrap_or(0),
            })
            .collect();
        // Stable, so ties stay in registration order.
        totals.sort_by(|a, b| b.votes.cmp(&a.votes));
        totals
    }

    /// Non-empty comments of counted ballots.
    pub fn ballot_comments(&self) -> BTreeSet<String> {
        self.ballots
            .values()
            .filter(|ballot| ballot.is_counted() && !ballot.voter_comments.is_empty())
            .map(|ballot| ballot.voter_comments.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_voter() -> (VotingStore, NationalId) {
        let store = VotingStore::new();
        let id = NationalId::new("111-11-1111");
        store
            .write()
            .add_voter(id.clone(), VoterRecord::example("adam").minimal)
            .unwrap();
        (store, id)
    }

    #[test]
    fn candidates_get_distinct_ids_in_order() {
        let store = VotingStore::new();
        let mut tables = store.write();
        let a = tables.add_candidate("Kathryn Collins");
        let b = tables.add_candidate("Aditya Guha");
        assert_ne!(a.candidate_id, b.candidate_id);
        assert_eq!(tables.candidates(), &[a.clone(), b]);
        assert_eq!(tables.candidate(a.candidate_id), Some(&a));
    }

    #[test]
    fn voters_are_added_once() {
        let (store, id) = store_with_voter();
        let mut tables = store.write();
        assert!(matches!(
            tables.add_voter(NationalId::new("111111111"), VoterRecord::example("again").minimal),
            Err(Error::AlreadyExists(_))
        ));
        assert_eq!(tables.voter(&id), Some(&VoterRecord::example("adam")));
        assert_eq!(tables.voter_status(&id), VoterStatus::RegisteredNotVoted);
    }

    #[test]
    fn absent_voter_is_not_registered() {
        let store = VotingStore::new();
        let id = NationalId::new("222222222");
        assert_eq!(store.read().voter_status(&id), VoterStatus::NotRegistered);
        assert!(matches!(
            store.write().set_voter_status(&id, VoterStatus::BallotCounted),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn fraudulent_voter_cannot_be_deleted() {
        let (store, id) = store_with_voter();
        let mut tables = store.write();
        tables.set_voter_status(&id, VoterStatus::FraudCommitted).unwrap();
        assert!(matches!(tables.delete_voter(&id), Err(Error::InvalidState(_))));
        assert_eq!(tables.voter_status(&id), VoterStatus::FraudCommitted);
        assert_eq!(tables.fraudulent_voters().count(), 1);
    }

    #[test]
    fn deleting_a_voter_invalidates_outstanding_ballots() {
        let (store, id) = store_with_voter();
        let mut tables = store.write();
        let counted = BallotNumber::from("counted");
        let outstanding = BallotNumber::from("outstanding");
        tables.add_ballot(counted.clone(), id.clone()).unwrap();
        tables.add_ballot(outstanding.clone(), id.clone()).unwrap();
        tables.record_vote(&counted, None, String::new()).unwrap();

        tables.delete_voter(&id).unwrap();
        assert_eq!(tables.voter_status(&id), VoterStatus::NotRegistered);
        assert_eq!(tables.ballot(&counted).unwrap().state, BallotState::Counted);
        assert_eq!(tables.ballot(&outstanding).unwrap().state, BallotState::Invalidated);
        assert!(matches!(tables.delete_voter(&id), Err(Error::NotFound(_))));
    }

    #[test]
    fn ballots_need_a_registered_owner_and_a_fresh_number() {
        let (store, id) = store_with_voter();
        let mut tables = store.write();
        let number = BallotNumber::from("abc");
        assert!(matches!(
            tables.add_ballot(number.clone(), NationalId::new("999999999")),
            Err(Error::NotFound(_))
        ));
        tables.add_ballot(number.clone(), id.clone()).unwrap();
        assert!(matches!(
            tables.add_ballot(number.clone(), id.clone()),
            Err(Error::AlreadyExists(_))
        ));
        assert!(tables.ballot_belongs_to(&number, &id));
        assert!(!tables.ballot_belongs_to(&number, &NationalId::new("999999999")));
        assert!(!tables.ballot_belongs_to(&BallotNumber::from("nope"), &id));
    }

    #[test]
    fn invalidation_is_permanent_and_idempotent() {
        let (store, id) = store_with_voter();
        let mut tables = store.write();
        let number = BallotNumber::from("abc");
        tables.add_ballot(number.clone(), id).unwrap();

        assert!(tables.ballot_is_valid(&number));
        assert!(tables.invalidate_ballot(&number).unwrap());
        assert!(!tables.invalidate_ballot(&number).unwrap());
        assert!(!tables.ballot_is_valid(&number));
        assert!(matches!(
            tables.record_vote(&number, None, String::new()),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            tables.invalidate_ballot(&BallotNumber::from("nope")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn counted_ballot_cannot_be_invalidated_or_recounted() {
        let (store, id) = store_with_voter();
        let mut tables = store.write();
        let number = BallotNumber::from("abc");
        tables.add_ballot(number.clone(), id.clone()).unwrap();
        tables
            .record_vote(&number, None, "kept".to_string())
            .unwrap();

        assert!(matches!(tables.invalidate_ballot(&number), Err(Error::InvalidState(_))));
        assert!(matches!(
            tables.record_vote(&number, None, "again".to_string()),
            Err(Error::InvalidState(_))
        ));
        let ballot = tables.ballot(&number).unwrap();
        assert!(ballot.is_used() && ballot.is_validated());
        assert_eq!(ballot.voter_comments, "kept");
        assert_eq!(tables.counted_ballots(&id), 1);
    }

    #[test]
    fn totals_are_descending_with_ties_in_registration_order() {
        let store = VotingStore::new();
        let mut tables = store.write();
        let a = tables.add_candidate("A");
        let b = tables.add_candidate("B");
        let c = tables.add_candidate("C");
        let votes = [
            ("1", Some(c.candidate_id)),
            ("2", Some(c.candidate_id)),
            ("3", Some(b.candidate_id)),
            ("4", Some(a.candidate_id)),
            ("5", None),
        ];
        for (tag, choice) in votes {
            let id = NationalId::new(tag);
            let number = BallotNumber::from(tag);
            tables.add_voter(id.clone(), VoterRecord::example(tag).minimal).unwrap();
            tables.add_ballot(number.clone(), id).unwrap();
            tables.record_vote(&number, choice, format!("comment {tag}")).unwrap();
        }

        let totals: Vec<_> = tables
            .vote_totals()
            .into_iter()
            .map(|total| (total.candidate.name, total.votes))
            .collect();
        assert_eq!(
            totals,
            vec![("C".to_string(), 2), ("A".to_string(), 1), ("B".to_string(), 1)]
        );
        assert_eq!(tables.ballot_comments().len(), 5);
    }

    #[test]
    fn reset_empties_everything() {
        let (store, id) = store_with_voter();
        store.write().add_candidate("A");
        store.reset();
        let tables = store.read();
        assert!(tables.candidates().is_empty());
        assert_eq!(tables.voter_status(&id), VoterStatus::NotRegistered);
        assert!(tables.ballot_comments().is_empty());
    }
}
