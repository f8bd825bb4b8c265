use serde::{Deserialize, Serialize};

use crate::model::common::{
    ballot::{Ballot, BallotNumber, BallotStatus},
    candidate::CandidateId,
};

/// Body of a count request: a filled-in ballot plus the national ID of the
/// voter presenting it.
///
/// Not `Debug`: it carries a plaintext national ID.
#[derive(Clone, Serialize, Deserialize)]
pub struct CountBallotRequest {
    pub ballot_number: BallotNumber,
    #[serde(default)]
    pub chosen_candidate_id: Option<CandidateId>,
    #[serde(default)]
    pub voter_comments: String,
    pub voter_national_id: String,
}

impl CountBallotRequest {
    pub fn ballot(&self) -> Ballot {
        Ballot::new(
            self.ballot_number.clone(),
            self.chosen_candidate_id,
            self.voter_comments.clone(),
        )
    }
}

/// Outcome of a count request as shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBallotResponse {
    pub status: String,
}

impl From<BallotStatus> for CountBallotResponse {
    /// A mismatched ballot is reported exactly like an invalid one, so the
    /// response cannot be used to probe which voter a ballot belongs to.
    fn from(status: BallotStatus) -> Self {
        let shown = match status {
            BallotStatus::VoterBallotMismatch => BallotStatus::InvalidBallot,
            other => other,
        };
        Self {
            status: shown.to_string(),
        }
    }
}
