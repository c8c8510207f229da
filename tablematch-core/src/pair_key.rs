/// Canonical identity for an unordered pair of person ids.
///
/// Every lookup keyed by a pair (history, compatibility matrix, signal
/// similarity) goes through [`pair_key`]. Building a key from ids in argument
/// order anywhere else is a bug.
use crate::constants::PAIR_KEY_DELIMITER;

/// Sort the two ids and join them with `:`. `pair_key(a, b) == pair_key(b, a)`.
pub fn pair_key(id_a: &str, id_b: &str) -> String {
    let (lo, hi) = if id_a <= id_b { (id_a, id_b) } else { (id_b, id_a) };
    let mut key = String::with_capacity(lo.len() + hi.len() + 1);
    key.push_str(lo);
    key.push(PAIR_KEY_DELIMITER);
    key.push_str(hi);
    key
}

/// Split a key back into its two ids, lower id first.
///
/// Ids containing the delimiter make the split ambiguous; the first
/// delimiter wins.
pub fn split_pair_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(PAIR_KEY_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(pair_key("b", "a"), "a:b");
        assert_eq!(pair_key("a", "b"), pair_key("b", "a"));
    }

    #[test]
    fn test_pair_key_sorts_lexicographically() {
        // "10" < "9" as strings
        assert_eq!(pair_key("9", "10"), "10:9");
    }

    #[test]
    fn test_split_pair_key() {
        assert_eq!(split_pair_key(&pair_key("zoe", "amy")), Some(("amy", "zoe")));
        assert_eq!(split_pair_key("no-delimiter"), None);
    }
}
