/// tablematch-core: multi-round pairing engine for speed-networking events.
///
/// Attendees → compatibility scores → one table per pair, every round, with
/// no pair ever meeting twice. No IO, no clocks, no storage. Scores come from
/// the caller.
///
/// People are identified by caller-provided string ids. Pairs are keyed by
/// [`pair_key`], which is the same no matter which order the ids come in.
///
/// # Quick start
///
/// ```rust
/// use tablematch_core::{
///     pair_key, solve_round, CompatibilityEntry, CompatibilityMatrix, PairingHistory, Person,
///     PitStopCounts,
/// };
///
/// let pool: Vec<Person> = ["ana", "ben", "cai", "dee", "eli"]
///     .into_iter()
///     .map(Person::new)
///     .collect();
///
/// let mut matrix = CompatibilityMatrix::new();
/// matrix.insert(pair_key("ana", "dee"), CompatibilityEntry::with_score(88));
/// matrix.insert(pair_key("ben", "cai"), CompatibilityEntry::with_score(74));
///
/// let round = solve_round(&pool, &matrix, &PairingHistory::new(), 6, &PitStopCounts::new(), None);
///
/// for p in &round.pairings {
///     println!("Table {}: {} + {} ({:.1})", p.table_number, p.person_a, p.person_b, p.composite_score);
/// }
/// assert_eq!(round.pairings.len(), 2);
/// assert!(round.pit_stop.is_some());
/// ```

pub mod constants;
pub mod engine;
pub mod error;
pub mod event;
pub mod matching;
pub mod pair_key;
pub mod pit_stop;
pub mod scoring;
pub mod signals;
pub mod solver;
pub mod types;

// Re-export primary public API at crate root.
pub use engine::{plan_remaining_rounds, solve_round, solve_round_with_config, EngineConfig};
pub use error::EventError;
pub use event::{Attendance, EventSession, PoolCounts};
pub use pair_key::{pair_key, split_pair_key};
pub use pit_stop::choose_pit_stop;
pub use scoring::{flatten_scores, match_score, score_breakdown, ForbiddenReason, PairScore, ScoreBreakdown};
pub use signals::SignalBook;
pub use solver::{solve_single_round, SolveContext};
pub use types::{
    Arrangement, Commitment, CompatibilityEntry, CompatibilityMatrix, Lane, Pairing,
    PairingHistory, Person, PitStopCounts, Role, RoundResult, RoundSolution, ScoreTable,
    SignalMap, Source,
};
