//! The storage-container seam the seeder and harness depend on.
//!
//! Only outcome classes and consumption accounting cross this boundary:
//! success/throttled for writes, found/not-found for point reads, and
//! charge-bearing pages for queries. Anything else is a fatal `Err`.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Classification of a single create. Throttled writes are the only
/// retryable outcome; duplicate ids and malformed requests surface as
/// errors and are never retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WriteOutcome {
    Created { charge: f64 },
    Throttled,
}

/// A successful point read with its consumption charge.
#[derive(Debug, Clone)]
pub struct PointRead {
    pub document: Value,
    pub charge: f64,
}

/// One page of query results. `continuation` is an opaque token; `None`
/// means the result set is drained.
#[derive(Debug, Clone)]
pub struct QueryPage {
    pub rows: Vec<Value>,
    pub charge: f64,
    pub continuation: Option<String>,
}

#[async_trait]
pub trait DocumentContainer: Send + Sync {
    /// Create-only write (not upsert), scoped to one partition key.
    async fn create_item(&self, body: &Value, partition_key: &str) -> Result<WriteOutcome>;

    /// Point read by id within one partition. `None` means not found,
    /// which is an expected outcome, not an error.
    async fn read_item(&self, id: &str, partition_key: &str) -> Result<Option<PointRead>>;

    /// Fetch one page of a query's results, resuming from `continuation`.
    async fn query_page(&self, query: &str, continuation: Option<&str>) -> Result<QueryPage>;
}
