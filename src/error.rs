use log::{error, warn};
use rocket::{http::Status, response::Responder};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Faults and store-level refusals.
///
/// Expected business outcomes (fraud, mismatched ballots, unregistered voters)
/// are never reported through this type; see `BallotStatus`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Name handle was not issued by this instance")]
    UnknownHandle,
    #[error("Cryptographic failure: {0}")]
    Crypto(String),
    #[error("Bad configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Regex(#[from] regex::Error),
    #[error(transparent)]
    Decode(#[from] data_encoding::DecodeError),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_state(what: impl Into<String>) -> Self {
        Self::InvalidState(what.into())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        // Only the status leaves the server; details could help correlate ballots.
        Err(match self {
            Self::NotFound(_) => {
                warn!("{self}");
                Status::NotFound
            }
            Self::AlreadyExists(_) | Self::InvalidState(_) => {
                warn!("{self}");
                Status::Conflict
            }
            Self::UnknownHandle
            | Self::Crypto(_)
            | Self::Config(_)
            | Self::Regex(_)
            | Self::Decode(_) => {
                error!("{self}");
                Status::InternalServerError
            }
        })
    }
}
