/// Choosing who sits out a round when the pool is odd.
use crate::types::{Person, PitStopCounts};

/// Pick the person who sits out this round.
///
/// Lowest `(times already sat out, is walk-up, id)` wins:
///   1. Nobody sits out twice while someone else has sat out fewer times.
///   2. Walk-ups arrived late and have fewer rounds left, so they are spared.
///   3. The id only makes the choice reproducible.
///
/// Returns `None` for an empty pool. Does not touch `counts`; the caller
/// records the pit stop once the round is committed.
pub fn choose_pit_stop<'a>(pool: &'a [Person], counts: &PitStopCounts) -> Option<&'a str> {
    pool.iter()
        .min_by(|a, b| rank(a, counts).cmp(&rank(b, counts)))
        .map(|p| p.id.as_str())
}

fn rank<'p>(person: &'p Person, counts: &PitStopCounts) -> (u32, bool, &'p str) {
    let times = counts.get(&person.id).copied().unwrap_or(0);
    (times, person.is_walk_up(), person.id.as_str())
}
