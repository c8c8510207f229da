/// Synthetic events for trying the engine without real applications.
///
/// Scores are random but lean on the same signals the engine rewards, so a
/// seeded event behaves roughly like a real one.
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use tablematch_core::{
    pair_key, Arrangement, Commitment, CompatibilityEntry, CompatibilityMatrix, Lane, Person, Role,
};

use crate::event_file::EventFile;

const ROLES: [Role; 6] = [
    Role::Engineering,
    Role::Product,
    Role::Gtm,
    Role::Science,
    Role::Ops,
    Role::Policy,
];
const LANES: [Lane; 3] = [Lane::Idea, Lane::Joiner, Lane::Flexible];
const COMMITMENTS: [Commitment; 3] = [Commitment::FullTime, Commitment::PartTime, Commitment::Exploring];
const ARRANGEMENTS: [Arrangement; 2] = [Arrangement::Colocated, Arrangement::RemoteOpen];
const LOCATIONS: [&str; 8] = ["SF", "NYC", "Boston", "Austin", "LA", "Seattle", "Denver", "Chicago"];

const AREAS: [&str; 19] = [
    "energy",
    "transport",
    "buildings",
    "food",
    "water",
    "carbon removal",
    "biodiversity",
    "circular economy",
    "climate finance",
    "policy",
    "grid infrastructure",
    "EVs",
    "solar",
    "wind",
    "hydrogen",
    "sustainable materials",
    "agriculture",
    "ocean",
    "forestry",
];

const FIRST_NAMES: [&str; 26] = [
    "Ada", "Ben", "Cara", "Dan", "Eve", "Finn", "Grace", "Hank", "Iris", "Jack", "Kate", "Leo",
    "Mia", "Nate", "Olive", "Pete", "Quinn", "Rosa", "Sam", "Tara", "Uri", "Vera", "Wade", "Xena",
    "Yuki", "Zane",
];

/// Co-located people in different cities lose this many points.
const DISTANCE_PENALTY: i64 = 30;

pub fn generate_event<R: Rng>(count: usize, rng: &mut R) -> EventFile {
    let people: Vec<Person> = (0..count).map(|i| generate_person(i, rng)).collect();
    let matrix = generate_matrix(&people, rng);
    EventFile {
        people,
        matrix,
        ..Default::default()
    }
}

fn generate_person<R: Rng>(index: usize, rng: &mut R) -> Person {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last_initial = (b'A' + ((index / FIRST_NAMES.len()) % 26) as u8) as char;

    let mut areas: Vec<String> = AREAS.iter().map(|a| a.to_string()).collect();
    areas.shuffle(rng);
    areas.truncate(rng.random_range(1..=4));

    let role = ROLES[rng.random_range(0..ROLES.len())];
    let others: Vec<Role> = ROLES.iter().copied().filter(|r| *r != role).collect();
    let role_needed = others[rng.random_range(0..others.len())];

    Person {
        id: format!("{:03}", index),
        name: format!("{} {}.", first, last_initial),
        role,
        role_needed,
        lane: LANES[rng.random_range(0..LANES.len())],
        primary_area: areas[0].clone(),
        interest_areas: areas,
        commitment: COMMITMENTS[rng.random_range(0..COMMITMENTS.len())],
        arrangement: ARRANGEMENTS[rng.random_range(0..ARRANGEMENTS.len())],
        location: LOCATIONS[rng.random_range(0..LOCATIONS.len())].to_string(),
        has_full_scoring: true,
        ..Default::default()
    }
}

/// One entry per pair: a 25..=75 base nudged up by complementary roles and
/// lanes and shared interests, down for incompatible cities, clamped to 1..=100.
pub fn generate_matrix<R: Rng>(people: &[Person], rng: &mut R) -> CompatibilityMatrix {
    let mut matrix = CompatibilityMatrix::new();

    for (i, a) in people.iter().enumerate() {
        for b in &people[i + 1..] {
            let mut score: i64 = rng.random_range(25..=75);

            if a.role != b.role && a.role_needed == b.role {
                score += rng.random_range(5..=15);
            }
            if b.role_needed == a.role {
                score += rng.random_range(5..=10);
            }
            if matches!((a.lane, b.lane), (Lane::Idea, Lane::Joiner) | (Lane::Joiner, Lane::Idea)) {
                score += rng.random_range(5..=10);
            }

            let shared: Vec<&String> = a
                .interest_areas
                .iter()
                .filter(|area| b.interest_areas.contains(*area))
                .collect();
            score += shared.len() as i64 * rng.random_range(2..=5);

            if a.primary_area == b.primary_area {
                score += rng.random_range(5..=10);
            }
            if a.wants_colocated() && b.wants_colocated() && a.location != b.location {
                score -= DISTANCE_PENALTY;
            }

            let score = score.clamp(1, 100);
            let topic = shared.first().map(|s| s.as_str()).unwrap_or(a.primary_area.as_str());
            let strength = if score > 70 {
                "Strong"
            } else if score > 45 {
                "Moderate"
            } else {
                "Weak"
            };

            matrix.insert(
                pair_key(&a.id, &b.id),
                CompatibilityEntry {
                    score,
                    rationale: format!(
                        "{} match based on {}/{} complementarity and {} overlap.",
                        strength,
                        role_label(a.role),
                        role_label(b.role),
                        topic
                    ),
                    spark: format!("Discuss approaches to {} and potential co-founding synergies.", topic),
                },
            );
        }
    }

    matrix
}

/// Pick `count` distinct people to leave, never the same person twice.
pub fn pick_departures<'a, R: Rng>(ids: &'a [String], count: usize, rng: &mut R) -> Vec<&'a String> {
    ids.choose_multiple(rng, count).collect()
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Engineering => "engineering",
        Role::Product => "product",
        Role::Gtm => "gtm",
        Role::Science => "science",
        Role::Ops => "ops",
        Role::Policy => "policy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_pair_scored() {
        let mut rng = StdRng::seed_from_u64(1);
        let event = generate_event(12, &mut rng);
        assert_eq!(event.people.len(), 12);
        assert_eq!(event.matrix.len(), 12 * 11 / 2);
        assert!(event.matrix.values().all(|e| (1..=100).contains(&e.score)));
    }

    #[test]
    fn test_same_seed_same_event() {
        let a = generate_event(8, &mut StdRng::seed_from_u64(42));
        let b = generate_event(8, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_people_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(9);
        let event = generate_event(30, &mut rng);
        let mut ids: Vec<&str> = event.people.iter().map(|p| p.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 30);
        for p in &event.people {
            assert_ne!(p.role, p.role_needed);
            assert!((1..=4).contains(&p.interest_areas.len()));
            assert_eq!(p.primary_area, p.interest_areas[0]);
        }
        assert_eq!(event.people[27].name, "Ben B.");
    }

    #[test]
    fn test_rationale_matches_score() {
        let mut rng = StdRng::seed_from_u64(5);
        let event = generate_event(10, &mut rng);
        for entry in event.matrix.values() {
            let expected = if entry.score > 70 {
                "Strong"
            } else if entry.score > 45 {
                "Moderate"
            } else {
                "Weak"
            };
            assert!(entry.rationale.starts_with(expected), "{}", entry.rationale);
        }
    }

    #[test]
    fn test_pick_departures_distinct() {
        let ids: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let mut picked = pick_departures(&ids, 4, &mut rng);
        picked.sort();
        picked.dedup();
        assert_eq!(picked.len(), 4);
    }
}
