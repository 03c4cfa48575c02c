//! Error taxonomy of the aggregation core.
//!
//! External feed failures are not represented here: they are recovered
//! inside the fetch layer and contribute an empty result, so a single dead
//! provider can never fail a whole aggregation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The property code is not registered in the configuration.
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    /// A reservation request misses required fields or is otherwise unusable.
    #[error("invalid reservation: {0}")]
    Validation(String),
    /// The reservation store is unreachable or rejected the operation.
    /// Internal reservations are authoritative, so this always escalates.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
