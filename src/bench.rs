//! Benchmark harness: paired query scenarios against both schemas.
//!
//! Scenarios run sequentially, and within a scenario schema A runs before
//! schema B, so the two measurements never contend for throughput. Every
//! query is drained to the last page; consumption, round-trips and result
//! cardinality accumulate across pages. Timing spans dispatch through full
//! drain.

use std::time::Instant;

use serde_json::Value;
use tracing::info;

use crate::container::DocumentContainer;
use crate::error::Result;
use crate::generator::Probe;
use crate::model::{BenchmarkResult, SchemaKind};

pub const SCENARIO_ALL_DEVICES: &str = "Get All Devices";
pub const SCENARIO_DEVICE_GROUP: &str = "Get Device Group";
pub const SCENARIO_POINT_READ: &str = "Point Read Device";

/// How many groups the "all devices" scenario treats as visible to the user.
const ACCESSIBLE_GROUPS: u32 = 5;

pub struct ScenarioRunner<'a> {
    schema_a: &'a dyn DocumentContainer,
    schema_b: &'a dyn DocumentContainer,
    group_count: u32,
    probe: Probe,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(
        schema_a: &'a dyn DocumentContainer,
        schema_b: &'a dyn DocumentContainer,
        group_count: u32,
        probe: Probe,
    ) -> Self {
        ScenarioRunner {
            schema_a,
            schema_b,
            group_count,
            probe,
        }
    }

    /// Run every scenario, schema A before schema B within each.
    pub async fn run_all(&self) -> Result<Vec<BenchmarkResult>> {
        let mut results = Vec::new();
        results.extend(self.get_all_devices().await?);
        results.extend(self.get_device_group().await?);
        results.push(self.point_read_device().await?);
        Ok(results)
    }

    /// All devices visible across the user's accessible groups.
    async fn get_all_devices(&self) -> Result<Vec<BenchmarkResult>> {
        let groups_filter = (1..=self.group_count.min(ACCESSIBLE_GROUPS))
            .map(|g| format!("'group-{g}'"))
            .collect::<Vec<_>>()
            .join(", ");
        info!(scenario = SCENARIO_ALL_DEVICES, groups = %groups_filter, "running scenario");

        let query_a = format!(
            "SELECT c.id FROM c WHERE c.type = 'device' AND c.groupId IN ({groups_filter})"
        );
        let a = drain_query(
            self.schema_a,
            SCENARIO_ALL_DEVICES,
            SchemaKind::DocumentPerDevice,
            &query_a,
            count_row,
        )
        .await?;

        // Schema B returns parent documents; the comparable cardinality is
        // the number of embedded device ids, not the number of parents.
        let query_b = format!("SELECT c.deviceIds FROM c WHERE c.id IN ({groups_filter})");
        let b = drain_query(
            self.schema_b,
            SCENARIO_ALL_DEVICES,
            SchemaKind::ArrayInGroup,
            &query_b,
            count_device_ids,
        )
        .await?;

        Ok(vec![a, b])
    }

    /// The owning group of one device.
    async fn get_device_group(&self) -> Result<Vec<BenchmarkResult>> {
        let device_id = &self.probe.device_id;
        info!(scenario = SCENARIO_DEVICE_GROUP, device_id, "running scenario");

        let query_a = format!(
            "SELECT c.groupId, c.path FROM c WHERE c.type = 'device' AND c.id = '{device_id}'"
        );
        let a = drain_query(
            self.schema_a,
            SCENARIO_DEVICE_GROUP,
            SchemaKind::DocumentPerDevice,
            &query_a,
            count_row,
        )
        .await?;

        let query_b = format!(
            "SELECT c.id, c.name, c.path FROM c WHERE ARRAY_CONTAINS(c.deviceIds, '{device_id}')"
        );
        let b = drain_query(
            self.schema_b,
            SCENARIO_DEVICE_GROUP,
            SchemaKind::ArrayInGroup,
            &query_b,
            count_row,
        )
        .await?;

        Ok(vec![a, b])
    }

    /// Point read of one device document. Schema A only: schema B has no
    /// per-device document, so no result is emitted for it.
    async fn point_read_device(&self) -> Result<BenchmarkResult> {
        info!(
            scenario = SCENARIO_POINT_READ,
            device_id = %self.probe.device_id,
            partition_key = %self.probe.partition_key,
            "running scenario"
        );
        point_read(
            self.schema_a,
            SCENARIO_POINT_READ,
            SchemaKind::DocumentPerDevice,
            &self.probe.device_id,
            &self.probe.partition_key,
        )
        .await
    }
}

/// Drain every page of a query, summing charge, round-trips and the
/// per-row cardinality `count_row` assigns.
pub async fn drain_query(
    container: &dyn DocumentContainer,
    scenario: &str,
    schema: SchemaKind,
    query: &str,
    count_row: fn(&Value) -> u64,
) -> Result<BenchmarkResult> {
    let start = Instant::now();
    let mut total_units = 0.0;
    let mut round_trips = 0u32;
    let mut documents_returned = 0u64;
    let mut continuation: Option<String> = None;

    loop {
        let page = container.query_page(query, continuation.as_deref()).await?;
        total_units += page.charge;
        round_trips += 1;
        documents_returned += page.rows.iter().map(count_row).sum::<u64>();
        match page.continuation {
            Some(token) => continuation = Some(token),
            None => break,
        }
    }

    Ok(BenchmarkResult {
        scenario: scenario.to_string(),
        schema,
        total_units,
        round_trips,
        elapsed: start.elapsed(),
        documents_returned,
    })
}

/// Point lookup. A miss is a legitimate outcome: zero consumption, zero
/// documents, one round-trip, no error.
pub async fn point_read(
    container: &dyn DocumentContainer,
    scenario: &str,
    schema: SchemaKind,
    id: &str,
    partition_key: &str,
) -> Result<BenchmarkResult> {
    let start = Instant::now();
    let read = container.read_item(id, partition_key).await?;
    let (total_units, documents_returned) = match read {
        Some(point) => (point.charge, 1),
        None => (0.0, 0),
    };
    Ok(BenchmarkResult {
        scenario: scenario.to_string(),
        schema,
        total_units,
        round_trips: 1,
        elapsed: start.elapsed(),
        documents_returned,
    })
}

/// Every row counts as one document.
pub fn count_row(_row: &Value) -> u64 {
    1
}

/// Rows are parent documents; count their embedded device ids instead.
pub fn count_device_ids(row: &Value) -> u64 {
    row.get("deviceIds")
        .and_then(Value::as_array)
        .map(|ids| ids.len() as u64)
        .unwrap_or(0)
}
