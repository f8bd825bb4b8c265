use serde::{Deserialize, Serialize};

use crate::model::common::voter::{MinimalVoter, VoterStatus};

/// A voter as stored. Only the minimal projection is kept; the canonical
/// national ID is the key of the voter table and lives nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    #[serde(flatten)]
    pub minimal: MinimalVoter,
    pub status: VoterStatus,
}

impl VoterRecord {
    /// A freshly registered voter.
    pub fn new(minimal: MinimalVoter) -> Self {
        Self {
            minimal,
            status: VoterStatus::RegisteredNotVoted,
        }
    }
}
