/// Attendee signals: "I'd like to talk to this person again".
///
/// Each person gets one signal per round. Two people signaling each other in
/// the same round is a mutual match. Accumulated signals feed the engine's
/// signal boost as a [`SignalMap`].
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{EventError, Result};
use crate::pair_key::pair_key;
use crate::types::SignalMap;

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalBook {
    /// round number -> (from -> to)
    rounds: BTreeMap<usize, HashMap<String, String>>,
}

impl SignalBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `from`'s signal for `round`, replacing any earlier signal they
    /// sent that round. Returns true when `to` signaled `from` in the same round.
    pub fn record(&mut self, round: usize, from: &str, to: &str) -> Result<bool> {
        if from == to {
            return Err(EventError::SelfSignal(from.to_string()));
        }
        let signals = self.rounds.entry(round).or_default();
        signals.insert(from.to_string(), to.to_string());
        Ok(signals.get(to).map(String::as_str) == Some(from))
    }

    /// Pair keys of every mutual match, across all rounds.
    pub fn mutual_matches(&self) -> HashSet<String> {
        let mut matches = HashSet::new();
        for signals in self.rounds.values() {
            for (from, to) in signals {
                if signals.get(to) == Some(from) {
                    matches.insert(pair_key(from, to));
                }
            }
        }
        matches
    }

    pub fn signals_for_round(&self, round: usize) -> Option<&HashMap<String, String>> {
        self.rounds.get(&round)
    }

    /// `{from: [to, ...]}` with each list in round order.
    pub fn signal_map(&self) -> SignalMap {
        let mut map = SignalMap::new();
        for signals in self.rounds.values() {
            for (from, to) in signals {
                map.entry(from.clone()).or_default().push(to.clone());
            }
        }
        map
    }

    /// Drop everything recorded for `round`.
    pub fn forget_round(&mut self, round: usize) {
        self.rounds.remove(&round);
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_way_signal_is_not_mutual() {
        let mut book = SignalBook::new();
        assert_eq!(book.record(1, "a", "b"), Ok(false));
        assert!(book.mutual_matches().is_empty());
    }

    #[test]
    fn test_mutual_signal() {
        let mut book = SignalBook::new();
        assert_eq!(book.record(1, "b", "a"), Ok(false));
        assert_eq!(book.record(1, "a", "b"), Ok(true));
        assert!(book.mutual_matches().contains("a:b"));
    }

    #[test]
    fn test_mutual_needs_same_round() {
        let mut book = SignalBook::new();
        book.record(1, "a", "b").unwrap();
        assert_eq!(book.record(2, "b", "a"), Ok(false));
        assert!(book.mutual_matches().is_empty());
    }

    #[test]
    fn test_new_signal_replaces_old_in_round() {
        let mut book = SignalBook::new();
        book.record(1, "a", "b").unwrap();
        book.record(1, "a", "c").unwrap();
        assert_eq!(book.signals_for_round(1).unwrap().get("a").unwrap(), "c");
        assert_eq!(book.signal_map().get("a"), Some(&vec!["c".to_string()]));
    }

    #[test]
    fn test_signal_map_in_round_order() {
        let mut book = SignalBook::new();
        book.record(3, "a", "d").unwrap();
        book.record(1, "a", "b").unwrap();
        book.record(2, "a", "c").unwrap();
        let map = book.signal_map();
        assert_eq!(map["a"], vec!["b", "c", "d"]);
    }

    #[test]
    fn test_self_signal_rejected() {
        let mut book = SignalBook::new();
        assert_eq!(book.record(1, "a", "a"), Err(EventError::SelfSignal("a".to_string())));
        assert!(book.is_empty());
    }

    #[test]
    fn test_forget_round() {
        let mut book = SignalBook::new();
        book.record(1, "a", "b").unwrap();
        book.record(2, "b", "c").unwrap();
        book.forget_round(2);
        assert!(book.signals_for_round(2).is_none());
        assert!(!book.signal_map().contains_key("b"));
    }
}
