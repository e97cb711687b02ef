//! Read-only access to the record pool.
//!
//! Storage lives with an external persistence collaborator; this crate only
//! defines the access seam and a simple in-memory implementation for tests
//! and embedded use.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::record::HistoricalRecord;

/// Read-only record source. Implementations must never hand out mutable
/// access; retrieval takes an owned snapshot per call.
#[async_trait]
pub trait RecordPool: Send + Sync {
    async fn snapshot(&self) -> Result<Vec<HistoricalRecord>>;
}

/// In-memory pool backed by a `tokio` RwLock.
#[derive(Default)]
pub struct InMemoryPool {
    records: RwLock<Vec<HistoricalRecord>>,
}

impl InMemoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: HistoricalRecord) {
        self.records.write().await.push(record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordPool for InMemoryPool {
    async fn snapshot(&self) -> Result<Vec<HistoricalRecord>> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let pool = InMemoryPool::new();
        pool.insert(HistoricalRecord::new(Utc::now(), "first")).await;

        let snap = pool.snapshot().await.unwrap();
        assert_eq!(snap.len(), 1);

        pool.insert(HistoricalRecord::new(Utc::now(), "second")).await;
        // The earlier snapshot is unaffected
        assert_eq!(snap.len(), 1);
        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_pool_yields_empty_snapshot() {
        let pool = InMemoryPool::new();
        assert!(pool.snapshot().await.unwrap().is_empty());
    }
}
