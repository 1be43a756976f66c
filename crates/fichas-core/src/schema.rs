//! Unified extra-field schema across a batch.

use std::collections::BTreeSet;

use crate::models::record::RecordBatch;

/// Sorted union of the extra-field labels of every successful record.
pub fn unify(batch: &RecordBatch) -> Vec<String> {
    batch
        .records()
        .flat_map(|record| record.extra_fields().keys())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
