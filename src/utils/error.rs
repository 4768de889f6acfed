//! Error types for metrics-search-reporter

use std::io;
use thiserror::Error;

/// Transport/backend-level errors
///
/// Raised by `DocumentStore` implementations. Any of these surfacing from a
/// bulk write or template call fails the whole reporting cycle.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to reach backend at {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        source: io::Error,
    },

    #[error("Backend offline: {0}")]
    Offline(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Request rejected by backend: {0}")]
    Rejected(String),

    #[error("Malformed backend response: {0}")]
    Response(String),
}

/// A single document rejected during a bulk submission
#[derive(Debug, Clone)]
pub struct RejectedDocument {
    /// Full metric name carried by the document
    pub name: String,
    /// Document type (metric kind)
    pub doc_type: String,
    /// Backend-supplied rejection reason
    pub reason: String,
}

/// Some documents in a cycle were rejected while others were accepted
///
/// Accepted documents remain persisted; there is no rollback. The rejected
/// ones are listed so the caller can see exactly what was lost this cycle.
#[derive(Error, Debug)]
#[error("{} of {attempted} documents rejected in bulk write", .failures.len())]
pub struct PartialWriteError {
    /// Documents submitted this cycle
    pub attempted: usize,
    /// Documents acknowledged by the backend
    pub accepted: usize,
    /// Rejected documents with reasons
    pub failures: Vec<RejectedDocument>,
}

/// Cycle-level reporting error
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Connectivity failure: {0}")]
    Connectivity(#[from] StoreError),

    #[error("Partial write failure: {0}")]
    PartialWrite(#[from] PartialWriteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
