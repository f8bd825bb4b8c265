//! Types shared between the API, the services and the store.

pub mod ballot;
pub mod candidate;
pub mod national_id;
pub mod voter;
