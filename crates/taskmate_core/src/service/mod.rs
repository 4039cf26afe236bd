//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate collaborator calls into the operations the screens perform.
//! - Validate input before any collaborator is called.
//! - Turn raw documents into typed records, reporting the ones that do not decode.
//!
//! # Invariants
//! - Services never write a record that failed validation.
//! - A document that fails to decode is reported, never dropped silently and
//!   never fatal to the rest of a list.
//! - Sample data is only served when fallback is enabled, and is always
//!   marked with `DataSource::Sample`.

use crate::agenda::{bucketize, BucketReport, Bucketable};
use crate::collab::{CollaboratorError, Document, DocumentId};
use crate::config::AppConfig;
use crate::model::schema::SchemaError;
use crate::validation::ValidationError;
use chrono::NaiveDateTime;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod auth_service;
pub mod goal_service;
pub mod profile_service;
pub mod reminder_service;
pub mod task_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    Collaborator(CollaboratorError),
    /// A document written or re-read by this call does not decode.
    Schema(SchemaError),
    NotFound(DocumentId),
    /// Operation does not apply in the current state (signed out, sample record).
    InconsistentState(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Collaborator(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InconsistentState(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Collaborator(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CollaboratorError> for ServiceError {
    fn from(value: CollaboratorError) -> Self {
        match value {
            CollaboratorError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Collaborator(other),
        }
    }
}

impl From<SchemaError> for ServiceError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

/// What to do when the document store cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    #[default]
    Strict,
    FallbackToSample,
}

impl FetchPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        if config.data.fallback_to_sample_data {
            Self::FallbackToSample
        } else {
            Self::Strict
        }
    }
}

/// Where listed records came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Live,
    /// Built-in placeholders served because the store failed with `cause`.
    Sample { cause: String },
}

impl DataSource {
    pub fn is_sample(&self) -> bool {
        matches!(self, Self::Sample { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub items: Vec<T>,
    /// Documents skipped because they did not decode.
    pub rejected: Vec<SchemaError>,
    pub source: DataSource,
}

impl<T> FetchOutcome<T> {
    fn live(items: Vec<T>, rejected: Vec<SchemaError>) -> Self {
        Self {
            items,
            rejected,
            source: DataSource::Live,
        }
    }

    fn sample(items: Vec<T>, cause: &CollaboratorError) -> Self {
        Self {
            items,
            rejected: Vec::new(),
            source: DataSource::Sample {
                cause: cause.to_string(),
            },
        }
    }
}

/// Bucketed records for one screen.
#[derive(Debug, Clone)]
pub struct Agenda<T> {
    pub report: BucketReport<T>,
    pub source: DataSource,
    pub schema_errors: Vec<SchemaError>,
}

impl<T: Clone + Bucketable> Agenda<T> {
    pub(crate) fn from_outcome(outcome: FetchOutcome<T>, now: NaiveDateTime) -> Self {
        let report = bucketize(&outcome.items, now).cloned();
        Self {
            report,
            source: outcome.source,
            schema_errors: outcome.rejected,
        }
    }
}

/// Decodes every document, collecting the failures instead of stopping.
pub(crate) fn decode_all<T>(
    documents: &[Document],
    decode: fn(&Document) -> Result<T, SchemaError>,
) -> (Vec<T>, Vec<SchemaError>) {
    let mut items = Vec::with_capacity(documents.len());
    let mut rejected = Vec::new();
    for document in documents {
        match decode(document) {
            Ok(item) => items.push(item),
            Err(err) => {
                warn!(
                    "event=document_decode module=service status=error collection={} id={} field={}",
                    err.collection.name(),
                    err.id,
                    err.field
                );
                rejected.push(err);
            }
        }
    }
    (items, rejected)
}

/// Sample records are read-only.
pub(crate) fn ensure_writable(id: &DocumentId) -> ServiceResult<()> {
    if crate::sample::is_sample_id(id) {
        return Err(ServiceError::InconsistentState(format!(
            "sample record `{id}` cannot be modified"
        )));
    }
    Ok(())
}
