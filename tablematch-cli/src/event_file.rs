/// Event files: the roster, compatibility matrix and any state carried over
/// from rounds already played, as one JSON document.
use serde::{Deserialize, Serialize};
use std::path::Path;

use tablematch_core::{
    pair_key, split_pair_key, CompatibilityMatrix, EngineConfig, EventError, EventSession,
    PairingHistory, Person, PitStopCounts, SignalBook,
};

use crate::bail;

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct EventFile {
    pub people: Vec<Person>,
    #[serde(default)]
    pub matrix: CompatibilityMatrix,
    /// Pair keys of everyone who has already met.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<String>,
    #[serde(default, skip_serializing_if = "PitStopCounts::is_empty")]
    pub pit_stop_counts: PitStopCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalRecord>,
}

/// "In round `round`, `from` wants to meet `to` again."
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub round: usize,
    pub from: String,
    pub to: String,
}

impl EventFile {
    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    /// History keys rebuilt through [`pair_key`], so a hand-edited "b:a"
    /// still matches the "a:b" the engine looks up.
    pub fn pairing_history(&self) -> Result<PairingHistory, EventError> {
        self.history
            .iter()
            .map(|key| match split_pair_key(key) {
                Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok(pair_key(a, b)),
                _ => Err(EventError::MalformedPairKey(key.clone())),
            })
            .collect()
    }

    pub fn signal_book(&self) -> Result<SignalBook, EventError> {
        let mut book = SignalBook::new();
        for s in &self.signals {
            book.record(s.round, &s.from, &s.to)?;
        }
        Ok(book)
    }

    /// Build a session with the carried-over state loaded and every person
    /// checked in.
    pub fn session(&self, rounds: usize, config: EngineConfig) -> Result<EventSession, EventError> {
        let history = self.pairing_history()?;

        let mut session = EventSession::new(self.people.clone(), self.matrix.clone(), rounds, config)?
            .with_history(history, self.pit_stop_counts.clone())
            .with_signals(self.signal_book()?);
        for person in &self.people {
            session.check_in(&person.id)?;
        }
        Ok(session)
    }
}

pub fn load_event(path: &Path) -> EventFile {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read event file {}: {e}", path.display())));
    parse_event(&content)
        .unwrap_or_else(|e| bail(format!("Failed to parse event file {}: {e}", path.display())))
}

pub fn parse_event(content: &str) -> Result<EventFile, serde_json::Error> {
    serde_json::from_str(content)
}

pub fn write_event(path: &Path, event: &EventFile) {
    let json = serde_json::to_string_pretty(event)
        .unwrap_or_else(|e| bail(format!("Failed to serialize event: {e}")));
    std::fs::write(path, json)
        .unwrap_or_else(|e| bail(format!("Failed to write event file {}: {e}", path.display())));
}
