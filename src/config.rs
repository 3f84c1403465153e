//! Run configuration.
//!
//! Everything comes from the command line; the connection string may also
//! arrive through `COSMOS_CONNECTION_STRING` (a `.env` file is honored).

use clap::Parser;

use crate::error::{Result, RubenchError};

pub const SCHEMA_A_CONTAINER: &str = "document-per-device";
pub const SCHEMA_B_CONTAINER: &str = "array-in-group";
pub const PARTITION_KEY_PATH: &str = "/partitionKey";
pub const CONNECTION_STRING_ENV: &str = "COSMOS_CONNECTION_STRING";

#[derive(Parser, Debug)]
#[command(
    name = "rubench",
    version,
    about = "Consumption-cost benchmark: document-per-device vs array-in-group modeling"
)]
pub struct Options {
    /// Cosmos DB connection string; falls back to COSMOS_CONNECTION_STRING.
    #[arg(short = 'c', long)]
    pub connection_string: Option<String>,

    /// Database name.
    #[arg(short = 'd', long, default_value = "iot-benchmark")]
    pub database: String,

    /// Number of groups to generate.
    #[arg(short = 'g', long = "groups", default_value_t = 100,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub group_count: u32,

    /// Number of devices per group.
    #[arg(long, default_value_t = 100,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub devices_per_group: u32,

    /// Drop, recreate and reseed the containers before benchmarking.
    #[arg(long)]
    pub seed: bool,

    /// Delete the containers after the run.
    #[arg(long)]
    pub cleanup: bool,
}

impl Options {
    pub fn resolve_connection_string(&self) -> Result<String> {
        self.connection_string
            .clone()
            .or_else(|| std::env::var(CONNECTION_STRING_ENV).ok())
            .ok_or_else(|| {
                RubenchError::Config(format!(
                    "connection string required: pass --connection-string or set {CONNECTION_STRING_ENV}"
                ))
            })
    }
}
