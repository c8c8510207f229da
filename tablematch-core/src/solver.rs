/// Single-round solver: weighted graph over the pool, maximum-cardinality
/// maximum-weight matching, sequential table numbers.
use std::collections::HashMap;

use tracing::trace;

use crate::constants::WEIGHT_SCALE;
use crate::engine::EngineConfig;
use crate::matching::{max_weight_matching, WeightedEdge};
use crate::pit_stop::choose_pit_stop;
use crate::scoring::{match_score, PairScore};
use crate::types::{
    CompatibilityMatrix, Pairing, PairingHistory, Person, PitStopCounts, RoundSolution, ScoreTable,
    SignalMap,
};

/// Inputs that stay fixed across every simulated round of one solve.
#[derive(Debug, Clone, Copy)]
pub struct SolveContext<'a> {
    pub matrix: &'a CompatibilityMatrix,
    pub signals: Option<&'a SignalMap>,
    /// Flattened matrix scores, needed for signal boosts.
    pub scores: Option<&'a ScoreTable>,
    pub config: &'a EngineConfig,
}

/// Solve one round against the given history and pit-stop counts.
///
/// Neither `history` nor `pit_stop_counts` is modified; the caller folds the
/// result in.
pub fn solve_single_round(
    pool: &[Person],
    history: &PairingHistory,
    rounds_remaining: usize,
    pit_stop_counts: &PitStopCounts,
    ctx: &SolveContext<'_>,
) -> RoundSolution {
    let pit_stop = if pool.len() % 2 == 1 {
        choose_pit_stop(pool, pit_stop_counts).map(str::to_string)
    } else {
        None
    };

    let seated: Vec<&Person> = pool
        .iter()
        .filter(|p| pit_stop.as_deref() != Some(p.id.as_str()))
        .collect();

    if seated.len() < 2 {
        return RoundSolution { pairings: Vec::new(), pit_stop };
    }

    let discount = if rounds_remaining > ctx.config.lookahead_min_rounds {
        ctx.config.lookahead_discount
    } else {
        1.0
    };

    let mut edges: Vec<WeightedEdge> = Vec::new();
    // Unclamped, undiscounted score per edge, reported back on the pairing.
    let mut composite: HashMap<(usize, usize), f64> = HashMap::new();

    for i in 0..seated.len() {
        for j in (i + 1)..seated.len() {
            let score = match_score(
                seated[i],
                seated[j],
                ctx.matrix,
                history,
                ctx.signals,
                ctx.scores,
                ctx.config,
            );
            let PairScore::Eligible(score) = score else {
                continue;
            };
            // The matcher needs non-negative weights.
            let weight = (score * discount).max(0.0);
            edges.push((i, j, (weight * WEIGHT_SCALE).round() as i64));
            composite.insert((i, j), score);
        }
    }

    trace!(people = seated.len(), edges = edges.len(), "built compatibility graph");

    let mate = max_weight_matching(seated.len(), &edges, true);

    let mut tables: Vec<(&str, &str, f64)> = mate
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let j = (*m)?;
            if j < i {
                return None;
            }
            let score = composite.get(&(i, j)).copied().unwrap_or(0.0);
            let (a, b) = (seated[i].id.as_str(), seated[j].id.as_str());
            Some(if a <= b { (a, b, score) } else { (b, a, score) })
        })
        .collect();
    tables.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));

    let pairings = tables
        .into_iter()
        .enumerate()
        .map(|(idx, (a, b, score))| Pairing {
            table_number: idx + 1,
            person_a: a.to_string(),
            person_b: b.to_string(),
            composite_score: score,
        })
        .collect();

    RoundSolution { pairings, pit_stop }
}
