//! Error kinds of the engine.

use crate::system::System;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A term does not have one of the expected shapes. Carries the
    /// printed form of the offending term.
    #[error("{reason}, in `{term}'")]
    BadTerm { reason: String, term: String },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store database error: {0}")]
    Db(#[from] sqlx::Error),

    /// Logical store failure: unknown id, no expandable content.
    #[error("store error: {0}")]
    Store(String),

    #[error("a `{required}' builder is required, but this is a `{host}'")]
    PlatformMismatch { required: System, host: System },

    #[error("output path `{0}' already exists")]
    OutputObstructed(String),

    #[error("path `{0}' obstructed")]
    PathObstructed(String),

    #[error("cannot build with `{builder}': {reason}")]
    Build { builder: String, reason: String },

    #[error("builder succeeded but did not create `{0}'")]
    BuildIncomplete(String),

    #[error("slice has no elements")]
    EmptySlice,
}

impl Error {
    pub fn bad_term<R, T>(reason: R, term: T) -> Self
    where
        R: Into<String>,
        T: Into<String>,
    {
        Error::BadTerm {
            reason: reason.into(),
            term: term.into(),
        }
    }
}
