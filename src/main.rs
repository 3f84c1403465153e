use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rubench::bench::{
    ScenarioRunner, SCENARIO_ALL_DEVICES, SCENARIO_DEVICE_GROUP, SCENARIO_POINT_READ,
};
use rubench::config::{
    Options, PARTITION_KEY_PATH, SCHEMA_A_CONTAINER, SCHEMA_B_CONTAINER,
};
use rubench::cosmos::{ConnectionString, CosmosClient};
use rubench::error::Result;
use rubench::generator::{Dataset, Probe};
use rubench::report;
use rubench::seeder::{self, SCHEMA_A_BATCH_SIZE, SCHEMA_B_BATCH_SIZE};

#[tokio::main]
async fn main() {
    // Load .env before reading the connection string from the environment.
    let _ = dotenvy::dotenv();
    let options = Options::parse();
    init_logging();

    if let Err(error) = run(options).await {
        tracing::error!(%error, "benchmark run failed");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(options: Options) -> Result<()> {
    print_banner(&options);

    let connection = ConnectionString::parse(&options.resolve_connection_string()?)?;
    let client = CosmosClient::new(&connection)?;

    client.create_database_if_not_exists(&options.database).await?;

    if options.seed {
        info!("dropping existing containers before reseeding");
        client.delete_container(&options.database, SCHEMA_A_CONTAINER).await?;
        client.delete_container(&options.database, SCHEMA_B_CONTAINER).await?;
    }
    client
        .create_container_if_not_exists(&options.database, SCHEMA_A_CONTAINER, PARTITION_KEY_PATH)
        .await?;
    client
        .create_container_if_not_exists(&options.database, SCHEMA_B_CONTAINER, PARTITION_KEY_PATH)
        .await?;

    let schema_a = client.container(&options.database, SCHEMA_A_CONTAINER);
    let schema_b = client.container(&options.database, SCHEMA_B_CONTAINER);

    if options.seed {
        let dataset = Dataset::generate(options.group_count, options.devices_per_group);

        // Ctrl-C cancels seeding; partially written batches stay in place.
        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling seeding");
                let _ = cancel_tx.send(true);
            }
        });

        seeder::write_all(&schema_a, &dataset.schema_a, SCHEMA_A_BATCH_SIZE, cancel_rx.clone())
            .await?;
        seeder::write_all(&schema_b, &dataset.schema_b, SCHEMA_B_BATCH_SIZE, cancel_rx).await?;

        info!("waiting for indexing to settle");
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    let probe = Probe::derive(options.group_count, options.devices_per_group);
    let runner = ScenarioRunner::new(&schema_a, &schema_b, options.group_count, probe);
    let results = runner.run_all().await?;

    println!();
    for scenario in [SCENARIO_ALL_DEVICES, SCENARIO_DEVICE_GROUP, SCENARIO_POINT_READ] {
        report::print_results(scenario, &results);
    }
    report::print_summary(&report::summarize(&results));

    if options.cleanup {
        client.delete_container(&options.database, SCHEMA_A_CONTAINER).await?;
        client.delete_container(&options.database, SCHEMA_B_CONTAINER).await?;
        info!("containers deleted");
    } else {
        info!("containers preserved; pass --cleanup to delete them");
    }

    Ok(())
}

fn print_banner(options: &Options) {
    println!("rubench: document-per-device vs array-in-group");
    println!("  database           {}", options.database);
    println!("  groups             {}", options.group_count);
    println!("  devices per group  {}", options.devices_per_group);
    println!(
        "  total devices      {}",
        options.group_count as u64 * options.devices_per_group as u64
    );
    println!("  seed               {}", options.seed);
    println!("  cleanup            {}", options.cleanup);
    println!();
}
