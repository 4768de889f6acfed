//! Bulk document submission
//!
//! Serializes records into documents and submits them in batches bounded
//! by the configured batch size. Item-level rejections accumulate across
//! batches; later batches are still attempted. A transport error aborts
//! the cycle.

use tracing::{debug, warn};

use super::collector::MetricRecord;
use super::index_name::IndexTarget;
use crate::backend::{BulkAction, DocumentStore};
use crate::utils::{RejectedDocument, StoreError};

/// Aggregated outcome of all bulk requests in one cycle
#[derive(Debug, Clone, Default)]
pub struct WriteOutcome {
    pub attempted: usize,
    pub accepted: usize,
    pub failures: Vec<RejectedDocument>,
    /// Positions of rejected records within the submitted slice
    pub rejected_positions: Vec<usize>,
}

impl WriteOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write all records to the target index in acknowledged batches
pub fn write_records(
    store: &dyn DocumentStore,
    records: &[MetricRecord],
    target: &IndexTarget,
    batch_size: usize,
) -> Result<WriteOutcome, StoreError> {
    let index = target.resolved();
    let mut outcome = WriteOutcome {
        attempted: records.len(),
        ..WriteOutcome::default()
    };

    for (batch_index, batch) in records.chunks(batch_size).enumerate() {
        let actions: Vec<BulkAction> = batch
            .iter()
            .map(|record| BulkAction {
                index: index.clone(),
                doc_type: record.kind.as_str().to_string(),
                document: record.document(),
            })
            .collect();

        let response = store.bulk_index(&actions)?;
        outcome.accepted += response.accepted;

        let batch_offset = batch_index * batch_size;
        for failure in response.failures {
            let record = &batch[failure.position];
            warn!(
                metric = %record.name,
                reason = %failure.reason,
                "Document rejected during bulk write"
            );
            outcome.rejected_positions.push(batch_offset + failure.position);
            outcome.failures.push(RejectedDocument {
                name: record.name.clone(),
                doc_type: record.kind.as_str().to_string(),
                reason: failure.reason,
            });
        }
    }

    debug!(
        index = %index,
        attempted = outcome.attempted,
        accepted = outcome.accepted,
        rejected = outcome.failures.len(),
        "Bulk write finished"
    );
    Ok(outcome)
}
