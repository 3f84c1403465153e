//! Deterministic synthetic dataset generation.
//!
//! Given group and device counts, produces the full document sets for both
//! schemas in increasing group-index order. Pure: identical inputs always
//! yield identical outputs, so benchmark runs are reproducible.

use crate::model::{Device, Group, GroupWithDevices, SeedDocument};

/// Number of partition-key shards documents are spread across.
const PARTITION_FANOUT: u32 = 10;

/// Partition key for a 1-based group index. Devices inherit their group's
/// key so a group and its devices land in the same partition.
pub fn partition_key_for(group_index: u32) -> String {
    format!("tenant-{}", (group_index % PARTITION_FANOUT) + 1)
}

/// The document the query scenarios probe for: a mid-dataset device, derived
/// from the configured sizes rather than hardcoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub device_id: String,
    pub group_id: String,
    pub partition_key: String,
}

impl Probe {
    pub fn derive(group_count: u32, devices_per_group: u32) -> Self {
        let g = (group_count / 2).max(1);
        let d = (devices_per_group / 2).max(1);
        Probe {
            device_id: format!("device-{g}-{d}"),
            group_id: format!("group-{g}"),
            partition_key: partition_key_for(g),
        }
    }
}

/// Both schemas' document sets plus the derived query probe.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// One group document and `devices_per_group` device documents per group.
    pub schema_a: Vec<SeedDocument>,
    /// One group-with-array document per group.
    pub schema_b: Vec<SeedDocument>,
    pub probe: Probe,
}

impl Dataset {
    pub fn generate(group_count: u32, devices_per_group: u32) -> Self {
        let mut schema_a =
            Vec::with_capacity((group_count * (devices_per_group + 1)) as usize);
        let mut schema_b = Vec::with_capacity(group_count as usize);

        for g in 1..=group_count {
            let group_id = format!("group-{g}");
            let group_path = format!("/root/group-{g}");
            let partition_key = partition_key_for(g);

            schema_a.push(SeedDocument::Group(Group {
                id: group_id.clone(),
                name: format!("Group {g}"),
                path: group_path.clone(),
                kind: "group".to_string(),
                partition_key: partition_key.clone(),
            }));

            let mut device_ids = Vec::with_capacity(devices_per_group as usize);
            for d in 1..=devices_per_group {
                let device_id = format!("device-{g}-{d}");
                schema_a.push(SeedDocument::Device(Device {
                    id: device_id.clone(),
                    group_id: group_id.clone(),
                    path: format!("{group_path}/{device_id}"),
                    kind: "device".to_string(),
                    partition_key: partition_key.clone(),
                }));
                device_ids.push(device_id);
            }

            schema_b.push(SeedDocument::GroupWithDevices(GroupWithDevices {
                id: group_id,
                name: format!("Group {g}"),
                path: group_path,
                device_ids,
                partition_key,
            }));
        }

        Dataset {
            schema_a,
            schema_b,
            probe: Probe::derive(group_count, devices_per_group),
        }
    }
}
