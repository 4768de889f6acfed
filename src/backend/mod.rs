//! Storage backend abstraction
//!
//! The reporting pipeline consumes the backend as a capability: it can
//! index documents in bulk, manage index templates, and run percolation
//! queries. Transport and query DSL belong to the implementation.

pub mod memory;

use serde::Serialize;
use serde_json::Value;

use crate::utils::StoreError;

pub use memory::{Condition, MemoryStore, StandingQuery, StoredDocument};

/// Schema template applied to indices matching a name pattern
#[derive(Debug, Clone, Serialize)]
pub struct IndexTemplate {
    pub name: String,
    /// Index name pattern the template applies to, e.g. `metrics*`
    pub pattern: String,
    /// Precedence when multiple templates match; lower loses
    pub order: u32,
    /// Field mappings keyed by document type
    pub mappings: Value,
}

/// One document in a bulk submission
#[derive(Debug, Clone)]
pub struct BulkAction {
    /// Destination index
    pub index: String,
    /// Document type (metric kind)
    pub doc_type: String,
    /// Document body
    pub document: Value,
}

/// Item-level rejection inside an otherwise delivered bulk request
#[derive(Debug, Clone)]
pub struct BulkItemFailure {
    /// Position of the rejected action within the submitted slice
    pub position: usize,
    pub reason: String,
}

/// Outcome of one bulk request
#[derive(Debug, Clone, Default)]
pub struct BulkResponse {
    /// Documents acknowledged by the backend
    pub accepted: usize,
    /// Item-level rejections; empty on full success
    pub failures: Vec<BulkItemFailure>,
}

/// Document-oriented search/storage backend capability
///
/// Implementations must be safe to share across threads; each call is
/// individually atomic from the backend's perspective. No transaction
/// spans multiple calls.
pub trait DocumentStore: Send + Sync {
    /// Backend display name for logs
    fn name(&self) -> &'static str;

    /// Check whether a template with the given name exists
    fn template_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Install a template. Overwrites any template with the same name;
    /// callers that must not clobber operator templates check existence
    /// first.
    fn put_template(&self, template: &IndexTemplate) -> Result<(), StoreError>;

    /// Submit a group of index actions, acknowledging each document
    ///
    /// A transport-level error fails the whole request; item-level
    /// rejections are returned in the response.
    fn bulk_index(&self, actions: &[BulkAction]) -> Result<BulkResponse, StoreError>;

    /// Match a document against the standing queries registered for an
    /// index, returning the identifiers of matching queries
    fn percolate(
        &self,
        index: &str,
        doc_type: &str,
        document: &Value,
    ) -> Result<Vec<String>, StoreError>;
}
