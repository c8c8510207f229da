/// Round engine orchestrator.
///
/// Pure computation: no IO, no clocks, no global settings. The caller owns
/// history and pit-stop counts and commits a solved round into them itself.
///
/// Every call re-solves the whole remaining horizon against a simulated copy
/// of that state and hands back only the first round. The rest of the plan is
/// thrown away and rebuilt next call, so late arrivals and departures are
/// picked up without any bookkeeping here.
use tracing::debug;

use crate::constants::{
    LOOKAHEAD_DISCOUNT, LOOKAHEAD_MIN_ROUNDS, SIGNAL_BOOST, SIGNAL_SIMILARITY_THRESHOLD,
};
use crate::pair_key::pair_key;
use crate::scoring::flatten_scores;
use crate::solver::{solve_single_round, SolveContext};
use crate::types::{
    CompatibilityMatrix, PairingHistory, Person, PitStopCounts, RoundSolution, SignalMap,
};

/// Tuning knobs for the engine. `Default` reproduces the stock constants.
///
/// Graph weights are rounded to steps of `1 / WEIGHT_SCALE` (0.01) before
/// matching. A tuned `signal_boost` or `lookahead_discount` whose effect on
/// a score falls between two steps is rounded with it: a boost below 0.005
/// never changes a pairing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Multiplier on graph weights while many rounds remain.
    pub lookahead_discount: f64,
    /// The discount applies when rounds remaining is strictly greater than this.
    pub lookahead_min_rounds: usize,
    /// Minimum external score between a signaled person and a candidate
    /// before the candidate inherits the signal boost.
    pub signal_similarity_threshold: i64,
    pub signal_boost: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            lookahead_discount: LOOKAHEAD_DISCOUNT,
            lookahead_min_rounds: LOOKAHEAD_MIN_ROUNDS,
            signal_similarity_threshold: SIGNAL_SIMILARITY_THRESHOLD,
            signal_boost: SIGNAL_BOOST,
        }
    }
}

/// Solve the next round with the default [`EngineConfig`].
///
/// Returns the round's pairings and pit stop. A pool smaller than two, or
/// `rounds_remaining == 0`, gives an empty solution.
pub fn solve_round(
    pool: &[Person],
    matrix: &CompatibilityMatrix,
    history: &PairingHistory,
    rounds_remaining: usize,
    pit_stop_counts: &PitStopCounts,
    signals: Option<&SignalMap>,
) -> RoundSolution {
    solve_round_with_config(
        pool,
        matrix,
        history,
        rounds_remaining,
        pit_stop_counts,
        signals,
        &EngineConfig::default(),
    )
}

/// [`solve_round`] with explicit tuning.
pub fn solve_round_with_config(
    pool: &[Person],
    matrix: &CompatibilityMatrix,
    history: &PairingHistory,
    rounds_remaining: usize,
    pit_stop_counts: &PitStopCounts,
    signals: Option<&SignalMap>,
    config: &EngineConfig,
) -> RoundSolution {
    if pool.len() < 2 {
        return RoundSolution::empty();
    }

    plan_remaining_rounds(
        pool,
        matrix,
        history,
        rounds_remaining,
        pit_stop_counts,
        signals,
        config,
    )
    .into_iter()
    .next()
    .unwrap_or_default()
}

/// Simulate every remaining round and return the whole schedule.
///
/// Round `i` is solved against the history and pit-stop counts produced by
/// rounds `0..i`, with `rounds_remaining - i` rounds left. The caller's
/// `history` and `pit_stop_counts` are not modified.
pub fn plan_remaining_rounds(
    pool: &[Person],
    matrix: &CompatibilityMatrix,
    history: &PairingHistory,
    rounds_remaining: usize,
    pit_stop_counts: &PitStopCounts,
    signals: Option<&SignalMap>,
    config: &EngineConfig,
) -> Vec<RoundSolution> {
    if pool.len() < 2 {
        return Vec::new();
    }

    let scores = flatten_scores(matrix);
    let ctx = SolveContext {
        matrix,
        signals,
        scores: Some(&scores),
        config,
    };

    let mut simulated_history = history.clone();
    let mut simulated_pit_stops = pit_stop_counts.clone();
    let mut schedule = Vec::with_capacity(rounds_remaining);

    for round_index in 0..rounds_remaining {
        let solution = solve_single_round(
            pool,
            &simulated_history,
            rounds_remaining - round_index,
            &simulated_pit_stops,
            &ctx,
        );

        debug!(
            round_index,
            pairs = solution.pairings.len(),
            pit_stop = ?solution.pit_stop,
            "simulated round"
        );

        for pairing in &solution.pairings {
            simulated_history.insert(pair_key(&pairing.person_a, &pairing.person_b));
        }
        if let Some(id) = &solution.pit_stop {
            *simulated_pit_stops.entry(id.clone()).or_insert(0) += 1;
        }

        schedule.push(solution);
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompatibilityEntry, Source};

    fn people(n: usize) -> Vec<Person> {
        (0..n).map(|i| Person::new(format!("p{:02}", i))).collect()
    }

    fn matrix_for(pool: &[Person]) -> CompatibilityMatrix {
        let mut matrix = CompatibilityMatrix::new();
        for (i, a) in pool.iter().enumerate() {
            for (j, b) in pool.iter().enumerate().skip(i + 1) {
                let score = 20 + ((i * 7 + j * 13) % 70) as i64;
                matrix.insert(pair_key(&a.id, &b.id), CompatibilityEntry::with_score(score));
            }
        }
        matrix
    }

    #[test]
    fn test_default_config_matches_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.lookahead_discount, 0.95);
        assert_eq!(config.lookahead_min_rounds, 3);
        assert_eq!(config.signal_similarity_threshold, 70);
        assert_eq!(config.signal_boost, 5.0);
    }

    #[test]
    fn test_single_attendee_returns_early() {
        let pool = people(1);
        let result = solve_round(
            &pool,
            &CompatibilityMatrix::new(),
            &PairingHistory::new(),
            5,
            &PitStopCounts::new(),
            None,
        );
        assert!(result.pairings.is_empty());
        assert!(result.pit_stop.is_none());
    }

    #[test]
    fn test_no_rounds_remaining_is_empty() {
        let pool = people(4);
        let result = solve_round(
            &pool,
            &matrix_for(&pool),
            &PairingHistory::new(),
            0,
            &PitStopCounts::new(),
            None,
        );
        assert_eq!(result, RoundSolution::empty());
    }

    #[test]
    fn test_plan_has_no_repeats() {
        let pool = people(10);
        let matrix = matrix_for(&pool);
        let plan = plan_remaining_rounds(
            &pool,
            &matrix,
            &PairingHistory::new(),
            6,
            &PitStopCounts::new(),
            None,
            &EngineConfig::default(),
        );
        assert_eq!(plan.len(), 6);

        let mut seen = PairingHistory::new();
        for round in &plan {
            assert_eq!(round.pairings.len(), 5);
            for p in &round.pairings {
                assert!(seen.insert(pair_key(&p.person_a, &p.person_b)), "repeat pair in plan");
            }
        }
    }

    #[test]
    fn test_solve_round_is_first_planned_round() {
        let pool = people(9);
        let matrix = matrix_for(&pool);
        let history = PairingHistory::new();
        let counts = PitStopCounts::new();
        let config = EngineConfig::default();

        let plan = plan_remaining_rounds(&pool, &matrix, &history, 4, &counts, None, &config);
        let first = solve_round_with_config(&pool, &matrix, &history, 4, &counts, None, &config);
        assert_eq!(plan[0], first);
    }

    #[test]
    fn test_caller_state_untouched() {
        let pool = people(7);
        let matrix = matrix_for(&pool);
        let history: PairingHistory = [pair_key("p00", "p01")].into_iter().collect();
        let counts: PitStopCounts = [("p03".to_string(), 1)].into_iter().collect();

        let _ = solve_round(&pool, &matrix, &history, 5, &counts, None);

        assert_eq!(history.len(), 1);
        assert_eq!(counts.get("p03"), Some(&1));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_planned_pit_stops_rotate() {
        let pool = people(5);
        let matrix = matrix_for(&pool);
        let plan = plan_remaining_rounds(
            &pool,
            &matrix,
            &PairingHistory::new(),
            5,
            &PitStopCounts::new(),
            None,
            &EngineConfig::default(),
        );
        let mut sat_out: Vec<String> = plan.iter().filter_map(|r| r.pit_stop.clone()).collect();
        sat_out.sort();
        sat_out.dedup();
        assert_eq!(sat_out.len(), 5);
    }

    #[test]
    fn test_walk_up_spared_in_first_round() {
        let mut pool = people(2);
        pool.push(Person {
            source: Source::WalkUp,
            ..Person::new("a-walk-up")
        });
        let result = solve_round(
            &pool,
            &matrix_for(&pool),
            &PairingHistory::new(),
            3,
            &PitStopCounts::new(),
            None,
        );
        assert_ne!(result.pit_stop.as_deref(), Some("a-walk-up"));
        assert_eq!(result.pairings.len(), 1);
    }

    #[test]
    fn test_signals_none_same_as_empty() {
        let pool = people(8);
        let matrix = matrix_for(&pool);
        let history = PairingHistory::new();
        let counts = PitStopCounts::new();
        let empty = SignalMap::new();

        let without = solve_round(&pool, &matrix, &history, 4, &counts, None);
        let with_empty = solve_round(&pool, &matrix, &history, 4, &counts, Some(&empty));
        assert_eq!(without, with_empty);
    }

    /// a, b, c, d with no bonuses. c and d already met, so one of
    /// {a-c, b-d} or {a-d, b-c} is seated. c scores 85 with d.
    fn signal_setup(a_d: i64) -> (Vec<Person>, CompatibilityMatrix, PairingHistory) {
        let pool: Vec<Person> = ["a", "b", "c", "d"].into_iter().map(Person::new).collect();
        let mut matrix = CompatibilityMatrix::new();
        let scores = [
            ("a", "b", 50),
            ("a", "c", 50),
            ("a", "d", a_d),
            ("b", "c", 50),
            ("b", "d", 50),
            ("c", "d", 85),
        ];
        for (x, y, score) in scores {
            matrix.insert(pair_key(x, y), CompatibilityEntry::with_score(score));
        }
        let history: PairingHistory = [pair_key("c", "d")].into_iter().collect();
        (pool, matrix, history)
    }

    fn partner<'a>(solution: &'a RoundSolution, id: &str) -> Option<&'a str> {
        solution.pairings.iter().find_map(|p| p.partner_of(id))
    }

    #[test]
    fn test_signal_boost_changes_pairing() {
        let (pool, matrix, history) = signal_setup(52);
        let counts = PitStopCounts::new();

        let plain = solve_round(&pool, &matrix, &history, 1, &counts, None);
        assert_eq!(partner(&plain, "a"), Some("d"));

        // a signaled d; c is similar to d (85 > 70), so a-c earns +5.
        let signals: SignalMap = [("a".to_string(), vec!["d".to_string()])].into_iter().collect();
        let boosted = solve_round(&pool, &matrix, &history, 1, &counts, Some(&signals));
        assert_eq!(partner(&boosted, "a"), Some("c"));

        let a_c = boosted.pairings.iter().find(|p| p.contains("a")).unwrap();
        assert_eq!(a_c.composite_score, 55.0);
        let b_d = boosted.pairings.iter().find(|p| p.contains("b")).unwrap();
        assert_eq!(b_d.composite_score, 50.0);
    }

    #[test]
    fn test_smallest_boost_still_breaks_tie() {
        let (pool, matrix, history) = signal_setup(50);
        let signals: SignalMap = [("a".to_string(), vec!["d".to_string()])].into_iter().collect();
        let config = EngineConfig {
            signal_boost: 0.01,
            ..EngineConfig::default()
        };

        let result = solve_round_with_config(
            &pool,
            &matrix,
            &history,
            1,
            &PitStopCounts::new(),
            Some(&signals),
            &config,
        );
        assert_eq!(partner(&result, "a"), Some("c"));
    }
}
