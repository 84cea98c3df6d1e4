//! Error types used across evtbox.
use thiserror::Error;

/// High-level error categories for store and adapter operations.
#[derive(Debug, Copy, Clone, Error)]
pub enum ErrorKind {
    #[error("invalid input")]
    InvalidInput,
    #[error("io error")]
    Io,
    #[error("parse error")]
    Parse,
    #[error("policy violation")]
    Policy,
}

/// Structured error with a kind and human message.
#[derive(Debug, Error)]
#[error("{kind:?}: {msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;
