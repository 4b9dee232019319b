//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::entities::{MenuId, UserId};

#[derive(Error, Debug)]
pub enum EngineError {
    /// The user's most recent vote is still inside the rolling window.
    /// Caller should retry no earlier than `next_allowed`.
    #[error("vote rejected: next vote allowed at {next_allowed}")]
    RateLimited { next_allowed: DateTime<Utc> },

    #[error("unknown menu: {0}")]
    UnknownMenu(MenuId),

    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// The catalog has no menus. Fatal precondition for serving a decision;
    /// surfaced to the operator, not as a transient user error.
    #[error("catalog has no menus")]
    NoMenus,

    #[error("repository error: {0}")]
    Repo(String),

    #[error("session error: {0}")]
    Auth(String),
}
