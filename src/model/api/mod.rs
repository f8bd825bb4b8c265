//! API-compatible types.
//!
//! The types in this module are what travels over HTTP. Candidate IDs are
//! serialised as strings.

pub mod ballot;
