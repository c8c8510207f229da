//! Reproducible attendees and compatibility matrices for integration tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use tablematch_core::{
    pair_key, solve_round, Arrangement, CompatibilityEntry, CompatibilityMatrix, Lane,
    PairingHistory, Person, PitStopCounts, Role, RoundSolution,
};

const ROLES: [Role; 6] = [
    Role::Engineering,
    Role::Product,
    Role::Gtm,
    Role::Science,
    Role::Ops,
    Role::Policy,
];
const LANES: [Lane; 3] = [Lane::Idea, Lane::Joiner, Lane::Flexible];
const AREAS: [&str; 6] = ["climate", "health", "fintech", "devtools", "edtech", "robotics"];
const CITIES: [&str; 3] = ["Berlin", "Lisbon", "Oslo"];

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `n` remote-open people with random roles, lanes and interests. Ids are
/// zero-padded so they sort numerically.
pub fn roster(n: usize, rng: &mut StdRng) -> Vec<Person> {
    (0..n).map(|i| random_person(format!("p{:03}", i), rng)).collect()
}

pub fn random_person(id: String, rng: &mut StdRng) -> Person {
    let mut areas: Vec<String> = AREAS.iter().map(|a| a.to_string()).collect();
    areas.shuffle(rng);
    areas.truncate(rng.random_range(1..=3));

    Person {
        role: *ROLES.choose(rng).unwrap(),
        role_needed: *ROLES.choose(rng).unwrap(),
        lane: *LANES.choose(rng).unwrap(),
        primary_area: areas[0].clone(),
        interest_areas: areas,
        location: CITIES.choose(rng).unwrap().to_string(),
        has_full_scoring: true,
        ..Person::new(id)
    }
}

/// Mark roughly half the roster as wanting to be co-located.
pub fn make_half_colocated(people: &mut [Person], rng: &mut StdRng) {
    for person in people.iter_mut() {
        if rng.random_bool(0.5) {
            person.arrangement = Arrangement::Colocated;
        }
    }
}

/// A matrix entry for every pair, scores uniform in 20..=95.
pub fn full_matrix(people: &[Person], rng: &mut StdRng) -> CompatibilityMatrix {
    let mut matrix = CompatibilityMatrix::new();
    for (i, a) in people.iter().enumerate() {
        for b in &people[i + 1..] {
            let score = rng.random_range(20..=95);
            matrix.insert(pair_key(&a.id, &b.id), CompatibilityEntry::with_score(score));
        }
    }
    matrix
}

/// Run `rounds` rounds back to back, folding each into history and
/// pit-stop counts the way a caller commits them.
pub fn run_rounds(
    pool: &[Person],
    matrix: &CompatibilityMatrix,
    rounds: usize,
) -> (Vec<RoundSolution>, PairingHistory, PitStopCounts) {
    let mut history = PairingHistory::new();
    let mut counts = PitStopCounts::new();
    let mut results = Vec::with_capacity(rounds);

    for round in 0..rounds {
        let solution = solve_round(pool, matrix, &history, rounds - round, &counts, None);
        for p in &solution.pairings {
            history.insert(pair_key(&p.person_a, &p.person_b));
        }
        if let Some(id) = &solution.pit_stop {
            *counts.entry(id.clone()).or_insert(0) += 1;
        }
        results.push(solution);
    }

    (results, history, counts)
}
