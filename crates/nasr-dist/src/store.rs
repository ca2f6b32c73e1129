//! Final sink for assembled record sets

use crate::records::RecordSet;
use crate::registry::RecordType;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Receives the finished, immutable record sets per record type
///
/// A commit replaces any previous set for the same type; readers hold
/// `Arc`s, so a set they already obtained stays valid.
#[derive(Debug, Default)]
pub struct DataStore {
    sets: RwLock<HashMap<RecordType, Arc<RecordSet>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a finished set, replacing any earlier one for the type
    pub async fn commit(&self, set: RecordSet) -> Arc<RecordSet> {
        let set = Arc::new(set);
        debug!(record_type = %set.record_type, records = set.len(), "record set committed");
        self.sets
            .write()
            .await
            .insert(set.record_type, Arc::clone(&set));
        set
    }

    /// The committed set for a record type, if any
    pub async fn get(&self, record_type: RecordType) -> Option<Arc<RecordSet>> {
        self.sets.read().await.get(&record_type).cloned()
    }

    /// Record types with a committed set
    pub async fn record_types(&self) -> Vec<RecordType> {
        self.sets.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_and_get() {
        let store = DataStore::new();
        assert!(store.get(RecordType::Airport).await.is_none());

        store
            .commit(RecordSet::new(RecordType::Airport, Vec::new()))
            .await;
        let set = store.get(RecordType::Airport).await.unwrap();
        assert!(set.is_empty());
        assert_eq!(store.record_types().await, vec![RecordType::Airport]);
    }
}
