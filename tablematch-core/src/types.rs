use std::collections::{HashMap, HashSet};

/// Functional role a person holds, or is looking for in a cofounder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Role {
    #[default]
    Engineering,
    Product,
    Gtm,
    Science,
    Ops,
    Policy,
}

/// Which side of a founding team a person is coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Lane {
    /// Has an idea and is looking for people to build it with.
    Idea,
    /// Wants to join someone else's idea.
    Joiner,
    #[default]
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Commitment {
    FullTime,
    PartTime,
    #[default]
    Exploring,
}

/// Work-arrangement preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Arrangement {
    /// Must work in the same city as a cofounder.
    Colocated,
    #[default]
    RemoteOpen,
}

/// How a person got onto the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Source {
    #[default]
    Application,
    Waitlist,
    /// Arrived at the door without registering; has no pre-event scoring.
    WalkUp,
}

/// An attendee as seen by the pairing engine.
///
/// Owned by the caller and treated as immutable for the duration of a solve.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Person {
    /// Unique, stable identifier. All pair keys are built from these.
    pub id: String,
    /// Display name. Not used for matching.
    pub name: String,
    pub role: Role,
    pub role_needed: Role,
    pub lane: Lane,
    /// Interest-area tags (e.g. "energy", "carbon-removal").
    pub interest_areas: Vec<String>,
    /// The single area the person cares most about. Empty = none given.
    pub primary_area: String,
    pub commitment: Commitment,
    pub arrangement: Arrangement,
    /// Free-text city. Empty = unknown.
    pub location: String,
    pub source: Source,
    /// Whether the external scorer has produced entries for this person.
    pub has_full_scoring: bool,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Person {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_walk_up(&self) -> bool {
        self.source == Source::WalkUp
    }

    pub fn wants_colocated(&self) -> bool {
        self.arrangement == Arrangement::Colocated
    }
}

/// Externally produced compatibility assessment for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompatibilityEntry {
    /// Quality score in 0..=100.
    pub score: i64,
    /// Why the scorer thinks the pair fits.
    pub rationale: String,
    /// Conversation starter for the table.
    pub spark: String,
}

impl CompatibilityEntry {
    pub fn with_score(score: i64) -> Self {
        CompatibilityEntry {
            score,
            ..Default::default()
        }
    }
}

/// Pair key -> compatibility entry. A missing key means "not scored yet",
/// which is distinct from an entry with score 0.
pub type CompatibilityMatrix = HashMap<String, CompatibilityEntry>;

/// Pair key -> external score, flattened out of a [`CompatibilityMatrix`].
pub type ScoreTable = HashMap<String, i64>;

/// Pair keys of everyone who has already sat together.
pub type PairingHistory = HashSet<String>;

/// Person id -> number of rounds that person sat out.
pub type PitStopCounts = HashMap<String, u32>;

/// Person id -> ids they signaled interest in, in the order signaled.
pub type SignalMap = HashMap<String, Vec<String>>;

/// One table in a round.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pairing {
    /// 1-based, sequential within a round.
    pub table_number: usize,
    pub person_a: String,
    pub person_b: String,
    /// Composite score that produced the match. Informational only.
    pub composite_score: f64,
}

impl Pairing {
    pub fn contains(&self, id: &str) -> bool {
        self.person_a == id || self.person_b == id
    }

    /// The other person at this table, if `id` sits here.
    pub fn partner_of(&self, id: &str) -> Option<&str> {
        if self.person_a == id {
            Some(&self.person_b)
        } else if self.person_b == id {
            Some(&self.person_a)
        } else {
            None
        }
    }
}

/// Output of one round's solve: the tables plus whoever sits out.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundSolution {
    pub pairings: Vec<Pairing>,
    pub pit_stop: Option<String>,
}

impl RoundSolution {
    pub fn empty() -> Self {
        RoundSolution::default()
    }
}

/// A committed round as recorded by an event session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundResult {
    /// 1-based round number within the event.
    pub round_number: usize,
    pub pairings: Vec<Pairing>,
    pub pit_stop: Option<String>,
    /// Mean composite score across tables, rounded to one decimal. 0.0 when empty.
    pub average_score: f64,
}

impl RoundResult {
    pub fn new(round_number: usize, solution: RoundSolution) -> Self {
        let average_score = average_composite_score(&solution.pairings);
        RoundResult {
            round_number,
            pairings: solution.pairings,
            pit_stop: solution.pit_stop,
            average_score,
        }
    }
}

/// Mean composite score rounded to one decimal place.
pub fn average_composite_score(pairings: &[Pairing]) -> f64 {
    if pairings.is_empty() {
        return 0.0;
    }
    let total: f64 = pairings.iter().map(|p| p.composite_score).sum();
    let mean = total / pairings.len() as f64;
    (mean * 10.0).round() / 10.0
}
