use std::fmt::{Debug, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque candidate handle. Serialises to a string so clients never do
/// arithmetic on it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CandidateId(u64);

impl CandidateId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl Debug for CandidateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CandidateId({})", self.0)
    }
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CandidateId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl TryFrom<String> for CandidateId {
    type Error = ParseIntError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CandidateId> for String {
    fn from(id: CandidateId) -> Self {
        id.to_string()
    }
}

/// A registered candidate. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: CandidateId,
    pub name: String,
}

/// A candidate together with the number of counted ballots cast for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTotal {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub votes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_serialises_as_string() {
        let id = CandidateId::from_raw(42);
        let json = rocket::serde::json::serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
        let back: CandidateId = rocket::serde::json::serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_rejects_garbage() {
        assert!("not-a-number".parse::<CandidateId>().is_err());
        assert_eq!(" 7 ".parse::<CandidateId>().unwrap(), CandidateId::from_raw(7));
    }
}
