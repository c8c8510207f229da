//! Full-event simulations through the public API.

mod common;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tablematch_core::{
    pair_key, solve_round, CompatibilityMatrix, EngineConfig, EventSession, PairingHistory,
    PitStopCounts,
};

#[test]
fn sixty_people_ten_rounds_no_repeats() {
    let mut rng = common::rng(60);
    let pool = common::roster(60, &mut rng);
    let matrix = common::full_matrix(&pool, &mut rng);

    let (rounds, history, counts) = common::run_rounds(&pool, &matrix, 10);

    for (i, round) in rounds.iter().enumerate() {
        assert_eq!(round.pairings.len(), 30, "round {} not full", i + 1);
        assert!(round.pit_stop.is_none());

        let seated: HashSet<&str> = round
            .pairings
            .iter()
            .flat_map(|p| [p.person_a.as_str(), p.person_b.as_str()])
            .collect();
        assert_eq!(seated.len(), 60, "round {} seats someone twice", i + 1);
    }
    assert_eq!(history.len(), 300, "a pair repeated");
    assert!(counts.is_empty());
}

#[test]
fn departures_after_round_three() {
    let mut rng = common::rng(50);
    let people = common::roster(50, &mut rng);
    let matrix = common::full_matrix(&people, &mut rng);
    let ids: Vec<String> = people.iter().map(|p| p.id.clone()).collect();

    let mut session = EventSession::new(people, matrix, 10, EngineConfig::default()).unwrap();
    for id in &ids {
        session.check_in(id).unwrap();
    }

    let departed: Vec<&String> = ids.iter().step_by(10).collect();
    let mut seen = HashSet::new();

    for round in 1..=10 {
        if round == 4 {
            for id in &departed {
                session.check_out(id).unwrap();
            }
        }
        let result = session.advance_round().unwrap().clone();

        if round <= 3 {
            assert_eq!(result.pairings.len(), 25);
            assert!(result.pit_stop.is_none());
        } else {
            assert_eq!(result.pairings.len(), 22);
            assert!(result.pit_stop.is_some());
            for p in &result.pairings {
                assert!(!departed.iter().any(|id| p.contains(id)), "departed person seated");
            }
        }

        for p in &result.pairings {
            assert!(seen.insert(pair_key(&p.person_a, &p.person_b)), "repeat in round {}", round);
        }
    }

    let counts = session.pool_counts();
    assert_eq!(counts.active, 45);
    assert_eq!(counts.departed, 5);
}

#[test]
fn odd_pool_pit_stops_spread_evenly() {
    let mut rng = common::rng(51);
    let pool = common::roster(51, &mut rng);
    let matrix = common::full_matrix(&pool, &mut rng);

    let (rounds, history, counts) = common::run_rounds(&pool, &matrix, 10);

    for round in &rounds {
        assert_eq!(round.pairings.len(), 25);
        let pit = round.pit_stop.as_deref().unwrap();
        assert!(round.pairings.iter().all(|p| !p.contains(pit)));
    }
    assert_eq!(history.len(), 250);
    assert_eq!(counts.values().sum::<u32>(), 10);
    assert!(counts.values().all(|&c| c <= 1), "someone sat out twice: {:?}", counts);
}

#[test]
fn colocated_people_stay_in_their_city() {
    let mut rng = common::rng(7);
    let mut pool = common::roster(30, &mut rng);
    common::make_half_colocated(&mut pool, &mut rng);
    let matrix = common::full_matrix(&pool, &mut rng);

    let (rounds, _, _) = common::run_rounds(&pool, &matrix, 6);
    let by_id = |id: &str| pool.iter().find(|p| p.id == id).unwrap();

    for round in &rounds {
        for p in &round.pairings {
            let (a, b) = (by_id(&p.person_a), by_id(&p.person_b));
            if a.wants_colocated() && b.wants_colocated() {
                assert!(a.location.eq_ignore_ascii_case(&b.location), "{} / {}", a.id, b.id);
            }
        }
    }
}

#[test]
fn late_walk_ups_get_seated() {
    let mut rng = common::rng(12);
    let people = common::roster(20, &mut rng);
    let matrix = common::full_matrix(&people, &mut rng);
    let ids: Vec<String> = people.iter().map(|p| p.id.clone()).collect();

    let mut session = EventSession::new(people, matrix, 6, EngineConfig::default()).unwrap();
    for id in &ids {
        session.check_in(id).unwrap();
    }
    session.advance_round().unwrap();
    session.advance_round().unwrap();

    // No matrix entries for walk-ups: they are paired on bonuses alone.
    for i in 0..3 {
        let walk_up = common::random_person(format!("w{}", i), &mut rng);
        session.add_walk_up(walk_up).unwrap();
    }

    let result = session.advance_round().unwrap();
    assert_eq!(result.pairings.len(), 11);
    let pit = result.pit_stop.as_deref().unwrap();
    assert!(!pit.starts_with('w'), "walk-up {} sat out first", pit);
    for i in 0..3 {
        let id = format!("w{}", i);
        assert!(result.pairings.iter().any(|p| p.contains(&id)));
    }
}

#[test]
fn eighty_people_solve_quickly() {
    let mut rng = common::rng(80);
    let pool = common::roster(80, &mut rng);
    let matrix = common::full_matrix(&pool, &mut rng);

    let start = Instant::now();
    let result = solve_round(&pool, &matrix, &PairingHistory::new(), 10, &PitStopCounts::new(), None);
    let elapsed = start.elapsed();

    assert_eq!(result.pairings.len(), 40);
    let limit = if cfg!(debug_assertions) { Duration::from_secs(30) } else { Duration::from_secs(3) };
    assert!(elapsed < limit, "took {:?}", elapsed);
}

#[test]
fn empty_matrix_still_pairs_everyone() {
    let mut rng = common::rng(3);
    let pool = common::roster(12, &mut rng);
    let (rounds, history, _) = common::run_rounds(&pool, &CompatibilityMatrix::new(), 4);
    assert!(rounds.iter().all(|r| r.pairings.len() == 6));
    assert_eq!(history.len(), 24);
}
