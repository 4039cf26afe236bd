//! Document store contract.
//!
//! Documents are schemaless key/value records. Typed views are decoded from
//! them in `crate::model`; nothing outside that boundary reads raw fields.

use super::CollabResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Raw document body.
pub type Fields = Map<String, Value>;

/// Opaque identifier assigned by the store at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One collection per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Goals,
    Reminders,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Goals => "goals",
            Self::Reminders => "reminders",
        }
    }
}

/// A stored record and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// List options. The default lists everything in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    /// Top-level field equality constraints, all of which must hold.
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, SortOrder)>,
    pub limit: Option<u32>,
}

impl DocumentQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hosted document database.
pub trait DocumentStore {
    fn list(&self, collection: Collection, query: &DocumentQuery) -> CollabResult<Vec<Document>>;

    /// Creates a document; the store assigns its id.
    fn create(&self, collection: Collection, fields: Fields) -> CollabResult<Document>;

    /// Merges `fields` into an existing document and returns the result.
    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: Fields,
    ) -> CollabResult<Document>;

    /// Removes a document. Missing ids are a no-op.
    fn delete(&self, collection: Collection, id: &DocumentId) -> CollabResult<()>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn list(&self, collection: Collection, query: &DocumentQuery) -> CollabResult<Vec<Document>> {
        (**self).list(collection, query)
    }

    fn create(&self, collection: Collection, fields: Fields) -> CollabResult<Document> {
        (**self).create(collection, fields)
    }

    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: Fields,
    ) -> CollabResult<Document> {
        (**self).update(collection, id, fields)
    }

    fn delete(&self, collection: Collection, id: &DocumentId) -> CollabResult<()> {
        (**self).delete(collection, id)
    }
}
