//! Document shapes for the two modeling strategies, plus the per-run
//! benchmark measurement record.
//!
//! Schema A ("document per device") stores one document per entity, devices
//! pointing at their group through `groupId`. Schema B ("array in group")
//! stores a single group document embedding all device ids. Both carry the
//! same `partitionKey` so partition-locality effects stay comparable.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Schema A group document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub partition_key: String,
}

/// Schema A device document. `partition_key` always equals the owning
/// group's, keeping a group and its devices co-located in one partition.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub group_id: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub partition_key: String,
}

/// Schema B group document with the embedded device-id array. Order is
/// generation order; write-once in this benchmark.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupWithDevices {
    pub id: String,
    pub name: String,
    pub path: String,
    pub device_ids: Vec<String>,
    pub partition_key: String,
}

/// Closed set of seedable document shapes. The bulk writer resolves each
/// document's partition key through this enum, so an unhandled shape is a
/// compile error rather than a runtime surprise.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SeedDocument {
    Group(Group),
    Device(Device),
    GroupWithDevices(GroupWithDevices),
}

impl SeedDocument {
    pub fn id(&self) -> &str {
        match self {
            SeedDocument::Group(g) => &g.id,
            SeedDocument::Device(d) => &d.id,
            SeedDocument::GroupWithDevices(g) => &g.id,
        }
    }

    pub fn partition_key(&self) -> &str {
        match self {
            SeedDocument::Group(g) => &g.partition_key,
            SeedDocument::Device(d) => &d.partition_key,
            SeedDocument::GroupWithDevices(g) => &g.partition_key,
        }
    }
}

/// Which modeling strategy a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    DocumentPerDevice,
    ArrayInGroup,
}

impl SchemaKind {
    pub fn label(&self) -> &'static str {
        match self {
            SchemaKind::DocumentPerDevice => "Document per Device",
            SchemaKind::ArrayInGroup => "Array in Group",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (scenario, schema) measurement. Constructed once by the harness and
/// never mutated; consumption units accumulate across all pages of a query.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub scenario: String,
    pub schema: SchemaKind,
    pub total_units: f64,
    pub round_trips: u32,
    pub elapsed: Duration,
    pub documents_returned: u64,
}
