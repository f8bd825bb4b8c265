//! Stored records and the in-memory store that owns them.

mod ballot;
pub use ballot::{BallotRecord, BallotState};

mod store;
pub use store::{Tables, VotingStore};

mod voter;
pub use voter::VoterRecord;
