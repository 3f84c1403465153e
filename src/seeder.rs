//! Partition-aware bulk write engine.
//!
//! Documents are written in fixed-size batches. Within a batch every write
//! is dispatched concurrently and the wave is joined before anything else
//! happens; the throttled subset becomes the next wave's work set, with
//! exponential backoff between waves. Batches are strictly sequential, so
//! peak in-flight requests are bounded by one batch's size.
//!
//! Writes are create-only. A duplicate-id conflict is fatal by design:
//! retrying it cannot succeed, and the throttled-subset retry already
//! guarantees committed documents are never re-sent.

use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::container::{DocumentContainer, WriteOutcome};
use crate::error::{Result, RubenchError};
use crate::model::SeedDocument;

/// Batch size for schema A's small per-entity documents.
pub const SCHEMA_A_BATCH_SIZE: usize = 25;
/// Smaller batch for schema B's array-bearing documents, bounding
/// per-request payload size and request-rate pressure.
pub const SCHEMA_B_BATCH_SIZE: usize = 10;

/// Maximum write waves per batch before giving up.
pub const MAX_RETRIES: u32 = 10;

const BACKOFF_BASE: Duration = Duration::from_millis(100);
const BACKOFF_CEILING: Duration = Duration::from_millis(5000);

/// Backoff before retry wave `attempt + 1`: doubles per attempt, clamped.
fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(BACKOFF_CEILING)
}

/// Resolves once cancellation is requested. A dropped sender means
/// cancellation can no longer arrive, not that it happened.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Write every document, batch by batch, absorbing throttling back-pressure.
///
/// Fails fatally on any non-throttle write error, on retry-budget
/// exhaustion (with the count of documents left unwritten), or when
/// `cancel` flips to true. Partially written batches are left in place.
pub async fn write_all(
    container: &dyn DocumentContainer,
    documents: &[SeedDocument],
    batch_size: usize,
    mut cancel: watch::Receiver<bool>,
) -> Result<()> {
    let batches = documents.chunks(batch_size).count();
    info!(documents = documents.len(), batch_size, batches, "seeding start");

    for (index, batch) in documents.chunks(batch_size).enumerate() {
        write_batch(container, batch, &mut cancel).await?;
        debug!(batch = index + 1, batches, written = batch.len(), "batch committed");
    }

    info!(documents = documents.len(), "seeding complete");
    Ok(())
}

/// One batch: fan out, join, retry the throttled subset.
async fn write_batch(
    container: &dyn DocumentContainer,
    batch: &[SeedDocument],
    cancel: &mut watch::Receiver<bool>,
) -> Result<()> {
    let mut remaining: Vec<&SeedDocument> = batch.iter().collect();

    for attempt in 0..MAX_RETRIES {
        if remaining.is_empty() {
            break;
        }
        if *cancel.borrow() {
            return Err(RubenchError::Cancelled);
        }

        let wave = join_all(remaining.iter().map(|doc| async move {
            let body = serde_json::to_value(doc)?;
            container.create_item(&body, doc.partition_key()).await
        }));
        let outcomes = tokio::select! {
            outcomes = wave => outcomes,
            _ = cancelled(cancel) => return Err(RubenchError::Cancelled),
        };

        // The wave is a barrier: all writes resolved before this point, so
        // the retry set is computed without any shared mid-flight state.
        let mut throttled = Vec::new();
        for (doc, outcome) in remaining.iter().zip(outcomes) {
            match outcome? {
                WriteOutcome::Created { .. } => {}
                WriteOutcome::Throttled => throttled.push(*doc),
            }
        }
        remaining = throttled;

        if !remaining.is_empty() && attempt + 1 < MAX_RETRIES {
            let delay = backoff_delay(attempt);
            warn!(
                attempt,
                throttled = remaining.len(),
                delay_ms = delay.as_millis() as u64,
                "write wave throttled, backing off"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancelled(cancel) => return Err(RubenchError::Cancelled),
            }
        }
    }

    if remaining.is_empty() {
        Ok(())
    } else {
        Err(RubenchError::RetryBudgetExhausted {
            unwritten: remaining.len(),
            retries: MAX_RETRIES,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_clamps() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(4), Duration::from_millis(1600));
        assert_eq!(backoff_delay(6), Duration::from_millis(5000));
        assert_eq!(backoff_delay(30), Duration::from_millis(5000));
    }
}
