/// Composite pair scoring.
///
/// Pure functions: no IO, no state. Hard constraints come back as
/// `PairScore::Forbidden`; everything else is an external compatibility
/// score plus deterministic bonuses and an optional signal boost.
use std::collections::HashSet;

use crate::constants::{
    AREA_OVERLAP_BONUS, LANE_BONUS, PRIMARY_AREA_BONUS, ROLE_BONUS, WALK_UP_MULTIPLIER,
};
use crate::engine::EngineConfig;
use crate::pair_key::pair_key;
use crate::types::{CompatibilityMatrix, Lane, PairingHistory, Person, ScoreTable, SignalMap};

/// Why two people may not sit together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// The pair already met in an earlier round.
    AlreadyMet,
    /// Both need a co-located cofounder and they live in different cities.
    DifferentCities,
}

/// Result of scoring a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairScore {
    Forbidden(ForbiddenReason),
    Eligible(f64),
}

impl PairScore {
    /// The weight, or `None` for a forbidden pair.
    pub fn value(self) -> Option<f64> {
        match self {
            PairScore::Eligible(w) => Some(w),
            PairScore::Forbidden(_) => None,
        }
    }

    pub fn is_forbidden(self) -> bool {
        matches!(self, PairScore::Forbidden(_))
    }
}

/// Every component that went into an eligible pair's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// External compatibility score, 0 when no entry exists.
    pub external: i64,
    /// Whether the compatibility matrix has an entry for this pair at all.
    pub has_entry: bool,
    pub role_bonus: i64,
    pub lane_bonus: i64,
    pub area_bonus: i64,
    /// Always 0 for walk-up fallback pairs.
    pub signal_boost: f64,
}

impl ScoreBreakdown {
    pub fn deterministic_bonus(&self) -> i64 {
        self.role_bonus + self.lane_bonus + self.area_bonus
    }

    /// No external score exists yet (as opposed to an entry scored 0).
    pub fn is_walk_up_fallback(&self) -> bool {
        self.external == 0 && !self.has_entry
    }

    pub fn total(&self) -> f64 {
        if self.is_walk_up_fallback() {
            return (self.deterministic_bonus() * WALK_UP_MULTIPLIER) as f64;
        }
        (self.external + self.deterministic_bonus()) as f64 + self.signal_boost
    }
}

/// Score a candidate pair.
///
/// `signals` and `scores` are optional: signal boosts apply only when both are
/// present. `scores` is the flattened matrix (see [`flatten_scores`]).
pub fn match_score(
    a: &Person,
    b: &Person,
    matrix: &CompatibilityMatrix,
    history: &PairingHistory,
    signals: Option<&SignalMap>,
    scores: Option<&ScoreTable>,
    config: &EngineConfig,
) -> PairScore {
    match score_breakdown(a, b, matrix, history, signals, scores, config) {
        Ok(breakdown) => PairScore::Eligible(breakdown.total()),
        Err(reason) => PairScore::Forbidden(reason),
    }
}

/// Same as [`match_score`] but keeps each component.
pub fn score_breakdown(
    a: &Person,
    b: &Person,
    matrix: &CompatibilityMatrix,
    history: &PairingHistory,
    signals: Option<&SignalMap>,
    scores: Option<&ScoreTable>,
    config: &EngineConfig,
) -> Result<ScoreBreakdown, ForbiddenReason> {
    let key = pair_key(&a.id, &b.id);

    if history.contains(&key) {
        return Err(ForbiddenReason::AlreadyMet);
    }
    if in_different_cities(a, b) {
        return Err(ForbiddenReason::DifferentCities);
    }

    let entry = matrix.get(&key);
    let mut breakdown = ScoreBreakdown {
        external: entry.map_or(0, |e| e.score),
        has_entry: entry.is_some(),
        role_bonus: role_bonus(a, b),
        lane_bonus: lane_bonus(a, b),
        area_bonus: area_bonus(a, b),
        signal_boost: 0.0,
    };

    if breakdown.is_walk_up_fallback() {
        return Ok(breakdown);
    }

    if let (Some(signals), Some(scores)) = (signals, scores) {
        breakdown.signal_boost = signal_boost(&a.id, &b.id, signals, scores, config)
            + signal_boost(&b.id, &a.id, signals, scores, config);
    }

    Ok(breakdown)
}

/// Pull just the numeric scores out of a matrix, for cheap repeated lookups.
pub fn flatten_scores(matrix: &CompatibilityMatrix) -> ScoreTable {
    matrix.iter().map(|(key, entry)| (key.clone(), entry.score)).collect()
}

fn in_different_cities(a: &Person, b: &Person) -> bool {
    a.wants_colocated()
        && b.wants_colocated()
        && !a.location.is_empty()
        && !b.location.is_empty()
        && a.location.to_lowercase() != b.location.to_lowercase()
}

fn role_bonus(a: &Person, b: &Person) -> i64 {
    if a.role == b.role {
        return 0;
    }
    let mut bonus = 0;
    if a.role_needed == b.role {
        bonus += ROLE_BONUS;
    }
    if b.role_needed == a.role {
        bonus += ROLE_BONUS;
    }
    bonus
}

fn lane_bonus(a: &Person, b: &Person) -> i64 {
    match (a.lane, b.lane) {
        (Lane::Idea, Lane::Joiner) | (Lane::Joiner, Lane::Idea) => LANE_BONUS,
        _ => 0,
    }
}

fn area_bonus(a: &Person, b: &Person) -> i64 {
    let a_areas: HashSet<&str> = a.interest_areas.iter().map(String::as_str).collect();
    let overlap = b
        .interest_areas
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&a_areas)
        .count() as i64;

    let primary = if !a.primary_area.is_empty() && a.primary_area == b.primary_area {
        PRIMARY_AREA_BONUS
    } else {
        0
    };

    overlap * AREA_OVERLAP_BONUS + primary
}

/// Revealed preference: if `from_id` signaled interest in people who score
/// highly with `candidate_id`, the candidate is probably what they want.
fn signal_boost(
    from_id: &str,
    candidate_id: &str,
    signals: &SignalMap,
    scores: &ScoreTable,
    config: &EngineConfig,
) -> f64 {
    let Some(interests) = signals.get(from_id) else {
        return 0.0;
    };
    interests
        .iter()
        .filter(|interest_id| {
            let similarity = scores.get(&pair_key(candidate_id, interest_id)).copied().unwrap_or(0);
            similarity > config.signal_similarity_threshold
        })
        .count() as f64
        * config.signal_boost
}
