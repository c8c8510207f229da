/// In-memory state of one running event.
///
/// `EventSession` owns the roster, who is in the room, pairing history,
/// pit-stop counts, signals and every seated round. All mutation goes through
/// `&mut self`, so at most one solve per event can be in flight.
///
/// A round's pairings enter the history when the *next* round is advanced.
/// Until then the current round can still be swapped or undone.
use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::engine::{plan_remaining_rounds, solve_round_with_config, EngineConfig};
use crate::error::{EventError, Result};
use crate::pair_key::pair_key;
use crate::signals::SignalBook;
use crate::types::{
    average_composite_score, CompatibilityEntry, CompatibilityMatrix, Pairing, PairingHistory,
    Person, PitStopCounts, RoundResult, RoundSolution, SignalMap, Source,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Attendance {
    #[default]
    NotArrived,
    CheckedIn,
    Departed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolCounts {
    pub active: usize,
    pub departed: usize,
    pub not_arrived: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct EventSession {
    /// Keyed by id so the active pool comes out sorted.
    people: BTreeMap<String, Person>,
    attendance: HashMap<String, Attendance>,
    matrix: CompatibilityMatrix,
    history: PairingHistory,
    pit_stop_counts: PitStopCounts,
    signals: SignalBook,
    rounds: Vec<RoundResult>,
    /// Keys each advance added to `history`, parallel to `rounds`.
    commits: Vec<Vec<String>>,
    total_rounds: usize,
    config: EngineConfig,
}

impl EventSession {
    pub fn new(
        roster: Vec<Person>,
        matrix: CompatibilityMatrix,
        total_rounds: usize,
        config: EngineConfig,
    ) -> Result<Self> {
        let mut people = BTreeMap::new();
        for person in roster {
            if people.contains_key(&person.id) {
                return Err(EventError::DuplicatePerson(person.id));
            }
            people.insert(person.id.clone(), person);
        }

        Ok(EventSession {
            people,
            attendance: HashMap::new(),
            matrix,
            history: PairingHistory::new(),
            pit_stop_counts: PitStopCounts::new(),
            signals: SignalBook::new(),
            rounds: Vec::new(),
            commits: Vec::new(),
            total_rounds,
            config,
        })
    }

    /// Seed history and pit-stop counts carried over from earlier rounds
    /// run elsewhere. These are never removed by [`Self::undo_last_round`].
    pub fn with_history(mut self, history: PairingHistory, pit_stop_counts: PitStopCounts) -> Self {
        self.history = history;
        self.pit_stop_counts = pit_stop_counts;
        self
    }

    /// Seed signals gathered before this session started.
    pub fn with_signals(mut self, signals: SignalBook) -> Self {
        self.signals = signals;
        self
    }

    // --- Attendance ---

    pub fn check_in(&mut self, id: &str) -> Result<&Person> {
        self.set_attendance(id, Attendance::CheckedIn)
    }

    pub fn check_out(&mut self, id: &str) -> Result<&Person> {
        self.set_attendance(id, Attendance::Departed)
    }

    fn set_attendance(&mut self, id: &str, status: Attendance) -> Result<&Person> {
        let person = self
            .people
            .get(id)
            .ok_or_else(|| EventError::UnknownPerson(id.to_string()))?;
        self.attendance.insert(id.to_string(), status);
        Ok(person)
    }

    /// Register someone who arrived without an application and check them in.
    pub fn add_walk_up(&mut self, mut person: Person) -> Result<&Person> {
        if self.people.contains_key(&person.id) {
            return Err(EventError::DuplicatePerson(person.id));
        }
        person.source = Source::WalkUp;
        let id = person.id.clone();
        info!(id = %id, "walk-up registered");
        self.people.insert(id.clone(), person);
        self.check_in(&id)
    }

    pub fn attendance(&self, id: &str) -> Option<Attendance> {
        self.people
            .get(id)
            .map(|_| self.attendance.get(id).copied().unwrap_or_default())
    }

    /// Checked-in people, sorted by id.
    pub fn active_pool(&self) -> Vec<Person> {
        self.people
            .values()
            .filter(|p| self.attendance(&p.id) == Some(Attendance::CheckedIn))
            .cloned()
            .collect()
    }

    pub fn pool_counts(&self) -> PoolCounts {
        let total = self.people.len();
        let count = |status: Attendance| {
            self.people
                .keys()
                .filter(|id| self.attendance(id) == Some(status))
                .count()
        };
        let active = count(Attendance::CheckedIn);
        let departed = count(Attendance::Departed);
        PoolCounts {
            active,
            departed,
            not_arrived: total - active - departed,
            total,
        }
    }

    // --- Compatibility ---

    /// Store or replace the matrix entry for a pair, e.g. once a walk-up's
    /// scoring finishes.
    pub fn set_pair_score(&mut self, id_a: &str, id_b: &str, entry: CompatibilityEntry) -> Result<()> {
        for id in [id_a, id_b] {
            if !self.people.contains_key(id) {
                return Err(EventError::UnknownPerson(id.to_string()));
            }
        }
        self.matrix.insert(pair_key(id_a, id_b), entry);
        Ok(())
    }

    // --- Rounds ---

    /// Commit the current round to history and seat the next one.
    pub fn advance_round(&mut self) -> Result<&RoundResult> {
        let rounds_remaining = self.rounds_remaining();
        if rounds_remaining == 0 {
            return Err(EventError::NoRoundsRemaining);
        }

        let mut committed = Vec::new();
        if let Some(current) = self.rounds.last() {
            for pairing in &current.pairings {
                let key = pair_key(&pairing.person_a, &pairing.person_b);
                if self.history.insert(key.clone()) {
                    committed.push(key);
                }
            }
        }

        let pool = self.active_pool();
        let signal_map = self.signal_map();
        let solution = solve_round_with_config(
            &pool,
            &self.matrix,
            &self.history,
            rounds_remaining,
            &self.pit_stop_counts,
            signal_map.as_ref(),
            &self.config,
        );

        if let Some(id) = &solution.pit_stop {
            *self.pit_stop_counts.entry(id.clone()).or_insert(0) += 1;
        }

        let result = RoundResult::new(self.rounds.len() + 1, solution);
        info!(
            round = result.round_number,
            pool = pool.len(),
            pairs = result.pairings.len(),
            pit_stop = ?result.pit_stop,
            average_score = result.average_score,
            "round advanced"
        );

        self.rounds.push(result);
        self.commits.push(committed);
        Ok(&self.rounds[self.rounds.len() - 1])
    }

    /// Preview every remaining round without committing anything.
    pub fn plan(&self) -> Vec<RoundSolution> {
        let mut history = self.history.clone();
        if let Some(current) = self.rounds.last() {
            for pairing in &current.pairings {
                history.insert(pair_key(&pairing.person_a, &pairing.person_b));
            }
        }
        let signal_map = self.signal_map();
        plan_remaining_rounds(
            &self.active_pool(),
            &self.matrix,
            &history,
            self.rounds_remaining(),
            &self.pit_stop_counts,
            signal_map.as_ref(),
            &self.config,
        )
    }

    /// Manual override: `id1` takes `id2`'s partner and vice versa. Tables
    /// keep their numbers; swapped pairs carry a composite score of 0.
    pub fn swap(&mut self, id1: &str, id2: &str) -> Result<&RoundResult> {
        let round = self.rounds.last_mut().ok_or(EventError::NoActiveRound)?;

        let table_of = |id: &str| {
            round
                .pairings
                .iter()
                .position(|p| p.contains(id))
                .ok_or_else(|| EventError::NotSeated(id.to_string()))
        };
        let idx1 = table_of(id1)?;
        let idx2 = table_of(id2)?;
        if idx1 == idx2 {
            return Err(EventError::SameTable(id1.to_string(), id2.to_string()));
        }

        let partner1 = round.pairings[idx1].partner_of(id1).unwrap_or_default().to_string();
        let partner2 = round.pairings[idx2].partner_of(id2).unwrap_or_default().to_string();

        let table1 = round.pairings[idx1].table_number;
        let table2 = round.pairings[idx2].table_number;
        round.pairings[idx1] = overridden(table1, id2, &partner1);
        round.pairings[idx2] = overridden(table2, id1, &partner2);
        round.average_score = average_composite_score(&round.pairings);

        info!(round = round.round_number, id1, id2, "pairing swapped");
        Ok(&*round)
    }

    /// Throw away the latest round. The round before it becomes current
    /// again, so its pairings leave the history until the next advance.
    pub fn undo_last_round(&mut self) -> Result<RoundResult> {
        let undone = self.rounds.pop().ok_or(EventError::NothingToUndo)?;
        let committed = self.commits.pop().unwrap_or_default();

        for key in &committed {
            self.history.remove(key);
        }
        if let Some(id) = &undone.pit_stop {
            if let Some(count) = self.pit_stop_counts.get_mut(id) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.pit_stop_counts.remove(id);
                }
            }
        }
        self.signals.forget_round(undone.round_number);

        info!(round = undone.round_number, "round undone");
        Ok(undone)
    }

    // --- Signals ---

    /// Record a signal for the current round. Returns true on a mutual match.
    pub fn record_signal(&mut self, from: &str, to: &str) -> Result<bool> {
        for id in [from, to] {
            if !self.people.contains_key(id) {
                return Err(EventError::UnknownPerson(id.to_string()));
            }
        }
        let round = self.round_number();
        if round == 0 {
            return Err(EventError::NoActiveRound);
        }
        let mutual = self.signals.record(round, from, to)?;
        if mutual {
            info!(round, from, to, "mutual match");
        }
        Ok(mutual)
    }

    /// Signals gathered so far; `None` until anyone has signaled.
    fn signal_map(&self) -> Option<SignalMap> {
        if self.signals.is_empty() {
            None
        } else {
            Some(self.signals.signal_map())
        }
    }

    // --- Read access ---

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.get(id)
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    pub fn matrix(&self) -> &CompatibilityMatrix {
        &self.matrix
    }

    pub fn history(&self) -> &PairingHistory {
        &self.history
    }

    pub fn pit_stop_counts(&self) -> &PitStopCounts {
        &self.pit_stop_counts
    }

    pub fn signals(&self) -> &SignalBook {
        &self.signals
    }

    pub fn current_round(&self) -> Option<&RoundResult> {
        self.rounds.last()
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    pub fn round_number(&self) -> usize {
        self.rounds.len()
    }

    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    pub fn rounds_remaining(&self) -> usize {
        self.total_rounds.saturating_sub(self.rounds.len())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn overridden(table_number: usize, id: &str, partner: &str) -> Pairing {
    let (a, b) = if id <= partner { (id, partner) } else { (partner, id) };
    Pairing {
        table_number,
        person_a: a.to_string(),
        person_b: b.to_string(),
        composite_score: 0.0,
    }
}
