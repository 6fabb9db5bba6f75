use serde::Serialize;

use crate::client::ClientRecord;
use crate::enums::BatchStrategy;

/// A bounded, ordered slice of the run's client records.
///
/// Members borrow from the sorted client list and keep its order.
#[derive(Debug, Clone, Serialize)]
pub struct Batch<'a> {
    pub strategy: BatchStrategy,
    /// School or board identifier; `None` for size batching.
    pub group_key: Option<String>,
    /// File-safe base name, e.g. `school_lincoln_elementary_01`.
    pub name: String,
    /// 1-based chunk index within the group.
    pub batch_number: usize,
    /// Number of chunks the group was split into.
    pub total_batches: usize,
    pub members: Vec<&'a ClientRecord>,
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
