mod common;

use std::sync::Arc;

use common::{ScriptedContainer, WriteScript};
use rubench::error::RubenchError;
use rubench::generator::Dataset;
use rubench::model::SeedDocument;
use rubench::seeder::{self, MAX_RETRIES};
use tokio::sync::watch;

fn sample_documents(count: usize) -> Vec<SeedDocument> {
    let dataset = Dataset::generate(3, 9);
    assert!(count <= dataset.schema_a.len());
    dataset.schema_a.into_iter().take(count).collect()
}

fn no_cancel() -> watch::Receiver<bool> {
    // Dropping the sender means cancellation can never arrive.
    watch::channel(false).1
}

#[tokio::test]
async fn clean_run_writes_every_document_once() {
    let container = ScriptedContainer::new(WriteScript::Succeed);
    let documents = sample_documents(12);

    seeder::write_all(&container, &documents, 5, no_cancel())
        .await
        .expect("clean run should succeed");

    assert_eq!(container.created_count(), 12);
    assert_eq!(container.max_attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn throttled_writes_retry_until_success() {
    // Throttled for the first 3 attempts on every document: the batch needs
    // exactly 3 + 1 waves to drain.
    let container = ScriptedContainer::new(WriteScript::ThrottleFirst(3));
    let documents = sample_documents(10);

    seeder::write_all(&container, &documents, 25, no_cancel())
        .await
        .expect("retries should eventually drain the batch");

    assert_eq!(container.max_attempts(), 4);
    assert_eq!(container.created_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn permanent_throttling_exhausts_the_retry_budget() {
    let container = ScriptedContainer::new(WriteScript::AlwaysThrottle);
    let documents = sample_documents(7);

    let result = seeder::write_all(&container, &documents, 25, no_cancel()).await;

    match result {
        Err(RubenchError::RetryBudgetExhausted { unwritten, retries }) => {
            assert_eq!(unwritten, 7);
            assert_eq!(retries, MAX_RETRIES);
        }
        other => panic!("expected retry-budget exhaustion, got {other:?}"),
    }
    // Exactly MAX_RETRIES waves, every document in each wave.
    assert_eq!(container.max_attempts(), MAX_RETRIES);
    assert_eq!(container.created_count(), 0);
}

#[tokio::test]
async fn fatal_write_aborts_without_retrying() {
    // device-1-2 sits in the first batch of three; the second batch must
    // never be attempted.
    let container = ScriptedContainer::new(WriteScript::FailOn("device-1-2"));
    let documents = sample_documents(6);

    let result = seeder::write_all(&container, &documents, 3, no_cancel()).await;

    assert!(matches!(result, Err(RubenchError::Unexpected { status: 409, .. })));
    assert_eq!(container.max_attempts(), 1, "fatal errors must not be retried");
    assert_eq!(container.attempted_ids().len(), 3);
}

#[tokio::test]
async fn cancellation_before_the_first_wave() {
    let container = ScriptedContainer::new(WriteScript::Succeed);
    let documents = sample_documents(4);
    let (tx, rx) = watch::channel(true);

    let result = seeder::write_all(&container, &documents, 25, rx).await;
    drop(tx);

    assert!(matches!(result, Err(RubenchError::Cancelled)));
    assert_eq!(container.created_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_backoff_stops_retrying() {
    let container = Arc::new(ScriptedContainer::new(WriteScript::AlwaysThrottle));
    let documents = sample_documents(4);
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn({
        let container = Arc::clone(&container);
        async move { seeder::write_all(container.as_ref(), &documents, 25, rx).await }
    });

    // Let the writer run its first wave and park in backoff, then cancel.
    tokio::task::yield_now().await;
    tx.send(true).expect("writer still listening");

    let result = handle.await.expect("writer task must not panic");
    assert!(matches!(result, Err(RubenchError::Cancelled)));
    assert!(
        container.max_attempts() < MAX_RETRIES,
        "cancellation must cut the retry loop short"
    );
}
