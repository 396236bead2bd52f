//! Domain error taxonomy shared by models, services, and route handlers.

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The addressed session, user, or record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// An active-only operation was attempted against a session in another state.
    #[error("{0}")]
    InvalidState(String),

    /// The presented token is stale, superseded, or not the session's current token.
    #[error("Attendance token is expired or invalid")]
    TokenExpired,

    /// A uniqueness rule would be violated (e.g. duplicate enrollment).
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
