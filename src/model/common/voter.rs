use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::national_id::NationalId;

/// A voter as presented at the registration boundary, with plaintext PII.
///
/// Nothing past registration keeps this type around; the store only ever
/// holds the [`MinimalVoter`] projection.
#[derive(Clone, PartialEq, Eq)]
pub struct Voter {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
}

impl Voter {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_id: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id: national_id.into(),
        }
    }

    /// The canonical form of this voter's national ID.
    pub fn canonical_id(&self) -> NationalId {
        NationalId::new(&self.national_id)
    }
}

/// The obfuscated view of a voter used everywhere outside registration.
///
/// The ID is a deterministic mask, suitable as a join key. The names are
/// randomised ciphertext handles that only the issuing `NameCipher` can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalVoter {
    pub obfuscated_first_name: String,
    pub obfuscated_last_name: String,
    pub obfuscated_national_id: String,
}

/// Where a voter stands in the election.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoterStatus {
    /// No record exists for the canonical ID.
    NotRegistered,
    RegisteredNotVoted,
    BallotCounted,
    /// Terminal. The voter tried to have a second ballot counted.
    FraudCommitted,
}

impl Display for VoterStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotRegistered => "not registered",
            Self::RegisteredNotVoted => "registered, but no ballot received",
            Self::BallotCounted => "ballot counted",
            Self::FraudCommitted => "fraud committed",
        })
    }
}
