/// Delimiter placed between the two sorted ids of a pair key.
pub const PAIR_KEY_DELIMITER: char = ':';

/// Bonus per direction when one person's sought role is the other's held role.
/// Both directions together give the maximum role bonus of 30.
pub const ROLE_BONUS: i64 = 15;

/// Bonus for pairing an idea-holder with a joiner (either order).
pub const LANE_BONUS: i64 = 10;

/// Bonus per interest-area tag present in both people's tag sets.
pub const AREA_OVERLAP_BONUS: i64 = 5;

/// Flat bonus when both people share the same primary interest area.
/// Independent of (and additive with) the overlap bonus.
pub const PRIMARY_AREA_BONUS: i64 = 10;

/// Multiplier applied to the deterministic bonuses when a pair has no
/// compatibility entry at all (walk-ups who arrived without pre-event scoring).
pub const WALK_UP_MULTIPLIER: i64 = 2;

/// External score a signaled person must share with a candidate before the
/// signal counts as evidence for that candidate.
pub const SIGNAL_SIMILARITY_THRESHOLD: i64 = 70;

/// Boost added per signaled person who is similar enough to the candidate.
pub const SIGNAL_BOOST: f64 = 5.0;

/// Multiplier applied to every edge weight while many rounds remain.
///
/// Slightly suppresses eagerness to lock in mediocre-looking matches early,
/// keeping full confidence for the rounds where few chances remain to fix
/// mistakes.
pub const LOOKAHEAD_DISCOUNT: f64 = 0.95;

/// The lookahead discount applies only while rounds remaining is strictly
/// greater than this value.
pub const LOOKAHEAD_MIN_ROUNDS: usize = 3;

/// Fixed-point scale used to turn floating-point edge weights into the
/// integers the matching algorithm works with.
///
/// Every composite score is a multiple of 0.05 after the lookahead discount,
/// so a scale of 100 represents all default-config weights exactly.
pub const WEIGHT_SCALE: f64 = 100.0;
