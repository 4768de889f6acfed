//! Shared utilities

pub mod error;

pub use error::{PartialWriteError, RejectedDocument, ReportError, Result, StoreError};
