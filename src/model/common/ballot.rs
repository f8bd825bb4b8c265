use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::candidate::CandidateId;

/// A public ballot number. Carries no information about its owner or about
/// when it was issued.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallotNumber(String);

impl BallotNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BallotNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BallotNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BallotNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A filled-in ballot as submitted for counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub ballot_number: BallotNumber,
    /// `None` is a blank ballot: counted, but not tallied for anyone.
    pub chosen_candidate_id: Option<CandidateId>,
    /// Free text. Redacted before it is stored; the original is discarded.
    #[serde(default)]
    pub voter_comments: String,
}

impl Ballot {
    pub fn new(
        ballot_number: BallotNumber,
        chosen_candidate_id: impl Into<Option<CandidateId>>,
        voter_comments: impl Into<String>,
    ) -> Self {
        Self {
            ballot_number,
            chosen_candidate_id: chosen_candidate_id.into(),
            voter_comments: voter_comments.into(),
        }
    }
}

/// Outcome of an attempt to count a ballot, in decreasing priority.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BallotStatus {
    VoterNotRegistered,
    VoterBallotMismatch,
    InvalidBallot,
    FraudCommitted,
    BallotCounted,
}

impl Display for BallotStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::VoterBallotMismatch => "the ballot doesn't belong to the voter specified",
            Self::InvalidBallot => "the ballot given is invalid",
            Self::FraudCommitted => "fraud committed: the voter has already voted",
            Self::VoterNotRegistered => "voter not registered",
            Self::BallotCounted => "ballot counted",
        })
    }
}
