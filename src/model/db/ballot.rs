use serde::{Deserialize, Serialize};

use crate::model::common::{candidate::CandidateId, national_id::NationalId};

/// Lifecycle of an issued ballot. `Counted` and `Invalidated` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotState {
    Issued,
    Counted,
    Invalidated,
}

/// A ballot as stored, including its private link to the owning voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotRecord {
    /// Never leaves the store.
    pub owner: NationalId,
    pub state: BallotState,
    pub chosen_candidate_id: Option<CandidateId>,
    /// Always the redacted form.
    pub voter_comments: String,
}

impl BallotRecord {
    /// A newly issued, blank ballot.
    pub fn issued_to(owner: NationalId) -> Self {
        Self {
            owner,
            state: BallotState::Issued,
            chosen_candidate_id: None,
            voter_comments: String::new(),
        }
    }

    /// False once invalidated, permanently.
    pub fn is_validated(&self) -> bool {
        self.state != BallotState::Invalidated
    }

    /// True once counted or invalidated; either way it cannot be used again.
    pub fn is_used(&self) -> bool {
        self.state != BallotState::Issued
    }

    pub fn is_counted(&self) -> bool {
        self.state == BallotState::Counted
    }
}
