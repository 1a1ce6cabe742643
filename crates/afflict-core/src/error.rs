//! Error types for afflict-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid effect definition: {0}")]
    InvalidConfig(String),

    #[error("Duplicate effect name: {0}")]
    DuplicateName(String),

    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    #[error("Not authorized: effect state may only be mutated by its owning authority")]
    NotAuthorized,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
