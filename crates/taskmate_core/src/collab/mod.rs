//! Backend collaborator contracts.
//!
//! # Responsibility
//! - Describe the hosted services the app talks to (document store, identity,
//!   object storage, OS notifications) as narrow traits.
//! - Give every collaborator failure one error type.
//!
//! # Invariants
//! - Collaborators never see validation: callers validate before calling.
//! - Deleting a missing document is a success.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document;
pub mod identity;
pub mod notifier;
pub mod storage;

pub use document::{
    Collection, Document, DocumentId, DocumentQuery, DocumentStore, Fields, SortOrder,
};
pub use identity::{IdentityService, OAuthProvider, Session, User};
pub use notifier::{LogNotifier, NotificationPayload, Notifier};
pub use storage::{FileRef, LocalObjectStorage, ObjectStorage};

pub type CollabResult<T> = Result<T, CollaboratorError>;

/// Failure reported by (or while talking to) a backend collaborator.
#[derive(Debug)]
pub enum CollaboratorError {
    /// Backend could not be reached or refused service.
    Unavailable(String),
    /// Backend understood the request and rejected it.
    Rejected(String),
    /// Update target does not exist.
    NotFound { collection: Collection, id: DocumentId },
    /// Local storage engine failure.
    Storage(DbError),
    Io(std::io::Error),
    /// Payload could not be encoded or decoded.
    Encoding(serde_json::Error),
}

impl Display for CollaboratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "backend unavailable: {message}"),
            Self::Rejected(message) => write!(f, "backend rejected request: {message}"),
            Self::NotFound { collection, id } => {
                write!(f, "document not found: {}/{id}", collection.name())
            }
            Self::Storage(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "invalid document payload: {err}"),
        }
    }
}

impl Error for CollaboratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CollaboratorError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for CollaboratorError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for CollaboratorError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}
