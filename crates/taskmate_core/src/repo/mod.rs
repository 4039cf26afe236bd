//! Persistence implementations of collaborator contracts.
//!
//! # Responsibility
//! - Back the `DocumentStore` contract with the core SQLite database.
//! - Keep SQL details out of services.
//!
//! # Invariants
//! - Stored documents are always valid JSON objects.
//! - Update of a missing id is `NotFound`; delete of a missing id succeeds.

pub mod document_repo;

pub use document_repo::SqliteDocumentStore;
