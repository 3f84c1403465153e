//! Result aggregation and console rendering.
//!
//! Results are grouped by scenario in first-seen order and paired across
//! schemas. The winner is the schema with strictly lower total consumption;
//! a tie, or a scenario only one schema can serve, falls back to schema A
//! "by default" rather than erroring.

use std::fmt;

use crate::model::{BenchmarkResult, SchemaKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    DocumentPerDevice { by_default: bool },
    ArrayInGroup,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::DocumentPerDevice { by_default: false } => {
                f.write_str(SchemaKind::DocumentPerDevice.label())
            }
            Winner::DocumentPerDevice { by_default: true } => {
                write!(f, "{} (by default)", SchemaKind::DocumentPerDevice.label())
            }
            Winner::ArrayInGroup => f.write_str(SchemaKind::ArrayInGroup.label()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub schema_a: Option<BenchmarkResult>,
    pub schema_b: Option<BenchmarkResult>,
    pub winner: Winner,
}

/// Group results by scenario (first-seen order) and pick each winner.
pub fn summarize(results: &[BenchmarkResult]) -> Vec<ScenarioSummary> {
    let mut grouped: Vec<(String, Option<BenchmarkResult>, Option<BenchmarkResult>)> = Vec::new();

    for result in results {
        let index = match grouped.iter().position(|(name, _, _)| *name == result.scenario) {
            Some(index) => index,
            None => {
                grouped.push((result.scenario.clone(), None, None));
                grouped.len() - 1
            }
        };
        let slot = &mut grouped[index];
        match result.schema {
            SchemaKind::DocumentPerDevice => slot.1 = Some(result.clone()),
            SchemaKind::ArrayInGroup => slot.2 = Some(result.clone()),
        }
    }

    grouped
        .into_iter()
        .map(|(scenario, schema_a, schema_b)| {
            let winner = pick_winner(schema_a.as_ref(), schema_b.as_ref());
            ScenarioSummary {
                scenario,
                schema_a,
                schema_b,
                winner,
            }
        })
        .collect()
}

fn pick_winner(a: Option<&BenchmarkResult>, b: Option<&BenchmarkResult>) -> Winner {
    match (a, b) {
        (Some(a), Some(b)) if b.total_units < a.total_units => Winner::ArrayInGroup,
        (Some(a), Some(b)) if a.total_units < b.total_units => {
            Winner::DocumentPerDevice { by_default: false }
        }
        // Tie, or only one schema could serve the scenario.
        _ => Winner::DocumentPerDevice { by_default: true },
    }
}

/// Per-scenario results table.
pub fn print_results(scenario: &str, results: &[BenchmarkResult]) {
    println!("{scenario}");
    println!(
        "  {:<22} {:>10} {:>8} {:>8} {:>10}",
        "Schema", "RUs", "Queries", "Docs", "Time (ms)"
    );
    for result in results.iter().filter(|r| r.scenario == scenario) {
        println!(
            "  {:<22} {:>10.2} {:>8} {:>8} {:>10}",
            result.schema.label(),
            result.total_units,
            result.round_trips,
            result.documents_returned,
            result.elapsed.as_millis()
        );
    }
    println!();
}

/// Final cross-scenario summary table.
pub fn print_summary(summaries: &[ScenarioSummary]) {
    println!("Summary");
    println!(
        "  {:<22} {:>22} {:>22}   {}",
        "Scenario", "Document per Device", "Array in Group", "Winner"
    );
    for summary in summaries {
        let a = summary
            .schema_a
            .as_ref()
            .map(|r| format!("{:.2} RUs", r.total_units))
            .unwrap_or_else(|| "n/a".to_string());
        let b = summary
            .schema_b
            .as_ref()
            .map(|r| format!("{:.2} RUs", r.total_units))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<22} {:>22} {:>22}   {}",
            summary.scenario, a, b, summary.winner
        );
    }
    println!();
}
