/// Output formatting: terminal tables and JSON.
use serde::Serialize;

use tablematch_core::{CompatibilityEntry, PoolCounts, RoundResult, RoundSolution, ScoreBreakdown};

use crate::bail;
use crate::event_file::EventFile;

#[derive(Serialize)]
struct JsonRunOutput<'a> {
    rounds: &'a [RoundResult],
    pool: PoolCounts,
    history_size: usize,
}

#[derive(Serialize)]
struct JsonPlannedRound<'a> {
    round: usize,
    #[serde(flatten)]
    solution: &'a RoundSolution,
}

fn display_name<'a>(event: &'a EventFile, id: &'a str) -> &'a str {
    match event.person(id) {
        Some(p) if !p.name.is_empty() => p.name.as_str(),
        _ => id,
    }
}

/// Print one seated round as a table.
pub fn print_round(event: &EventFile, label: &str, solution: &RoundSolution) {
    let name_width = solution
        .pairings
        .iter()
        .flat_map(|p| [display_name(event, &p.person_a), display_name(event, &p.person_b)])
        .map(str::len)
        .max()
        .unwrap_or(6)
        .max(6); // at least "Person"

    println!("{label}");
    println!("Table | {:<name_width$} | {:<name_width$} | Score", "Person", "Person");
    println!("------|-{}-|-{}-|------", "-".repeat(name_width), "-".repeat(name_width));

    for p in &solution.pairings {
        println!(
            "{:>5} | {:<name_width$} | {:<name_width$} | {:>5.1}",
            p.table_number,
            display_name(event, &p.person_a),
            display_name(event, &p.person_b),
            p.composite_score,
        );
    }

    if let Some(id) = &solution.pit_stop {
        println!("Pit stop: {}", display_name(event, id));
    }
    println!();
}

/// Print a finished run as a table per round.
pub fn print_run_table(event: &EventFile, rounds: &[RoundResult], pool: PoolCounts) {
    for round in rounds {
        let solution = RoundSolution {
            pairings: round.pairings.clone(),
            pit_stop: round.pit_stop.clone(),
        };
        let label = format!("Round {} (average {:.1})", round.round_number, round.average_score);
        print_round(event, &label, &solution);
    }
    println!(
        "{} rounds seated | {} active, {} departed, {} not arrived, {} total",
        rounds.len(),
        pool.active,
        pool.departed,
        pool.not_arrived,
        pool.total,
    );
}

pub fn print_run_json(rounds: &[RoundResult], pool: PoolCounts, history_size: usize) {
    let output = JsonRunOutput { rounds, pool, history_size };
    print_json(&output);
}

pub fn print_plan_table(event: &EventFile, plan: &[RoundSolution]) {
    for (i, solution) in plan.iter().enumerate() {
        print_round(event, &format!("Planned round {}", i + 1), solution);
    }
    println!("{} rounds planned. Only the first is ever committed.", plan.len());
}

pub fn print_plan_json(plan: &[RoundSolution]) {
    let rounds: Vec<JsonPlannedRound> = plan
        .iter()
        .enumerate()
        .map(|(i, solution)| JsonPlannedRound { round: i + 1, solution })
        .collect();
    print_json(&rounds);
}

/// Print how a pair's score was put together.
pub fn print_breakdown(
    event: &EventFile,
    id_a: &str,
    id_b: &str,
    breakdown: &ScoreBreakdown,
    entry: Option<&CompatibilityEntry>,
) {
    println!("{} + {}", display_name(event, id_a), display_name(event, id_b));
    if breakdown.has_entry {
        println!("  external score   {:>6}", breakdown.external);
    } else {
        println!("  external score      -  (not scored, bonuses count double)");
    }
    println!("  role bonus       {:>6}", breakdown.role_bonus);
    println!("  lane bonus       {:>6}", breakdown.lane_bonus);
    println!("  area bonus       {:>6}", breakdown.area_bonus);
    println!("  signal boost     {:>6.1}", breakdown.signal_boost);
    println!("  total            {:>6.1}", breakdown.total());

    if let Some(entry) = entry {
        if !entry.rationale.is_empty() {
            println!("\nWhy: {}", entry.rationale);
        }
        if !entry.spark.is_empty() {
            println!("Spark: {}", entry.spark);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| bail(format!("Failed to serialize output: {e}")));
    println!("{json}");
}
