//! Console failure taxonomy.
//!
//! Local validation failures never reach the network; backend rejections
//! carry their result code; transport failures are generic; a 401 means the
//! session is gone and only a full reload helps. Nothing is retried.

use relaypanel_grants::{RejectKind, ValidationError};

/// Failure talking to the panel backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The backend answered 401; local state can no longer be trusted and
    /// the console must reload.
    #[error("session invalid, reload required")]
    SessionExpired,
    /// The backend processed the request and said no.
    #[error("operate failed, {0}")]
    Rejected(RejectKind),
    /// The request never completed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered something the console cannot interpret.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Failure of a console operation.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Form fields failed validation; shown inline, nothing was sent.
    #[error("invalid fields: {0:?}")]
    Invalid(Vec<ValidationError>),
    /// No rows were selected for a bulk operation or export.
    #[error("no users selected")]
    NothingSelected,
    #[error(transparent)]
    Client(#[from] ClientError),
}
