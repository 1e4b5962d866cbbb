/// Identifier for a rule registered with the blocking engine.
pub type RuleId = u32;

/// The engine accepts integer ids in `1..RULE_ID_SPACE`.
pub const RULE_ID_SPACE: u32 = 1_000_000;

/// Primary id strategy: wall clock plus a rolling hash of the domain,
/// reduced into the engine's id space. Best-effort uniqueness only; a
/// collision is handled by retrying with [`fallback_rule_id`].
pub fn primary_rule_id(domain: &str, unix_millis: u64) -> RuleId {
    let timestamp = unix_millis % u64::from(RULE_ID_SPACE);
    let combined = (timestamp + u64::from(rolling_hash(domain))) % u64::from(RULE_ID_SPACE);
    (combined as u32).max(1)
}

/// Fallback id strategy used after a duplicate-id rejection: wall clock plus
/// a random component and the domain length, so the retry draws from
/// different entropy than the hash-based primary.
pub fn fallback_rule_id(unix_millis: u64, random: u32, domain_len: usize) -> RuleId {
    let timestamp = unix_millis % u64::from(RULE_ID_SPACE);
    let combined =
        (timestamp + u64::from(random % 10_000) + domain_len as u64) % u64::from(RULE_ID_SPACE);
    (combined as u32).max(1)
}

fn rolling_hash(domain: &str) -> u32 {
    let mut hash: i64 = 0;
    for byte in domain.bytes() {
        hash = ((hash << 5) - hash + i64::from(byte)) & 0x7fff_ffff;
    }
    hash as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_id_stays_in_engine_space() {
        for (domain, millis) in [
            ("facebook.com", 0u64),
            ("youtube.com", 1_722_000_000_000),
            ("a.io", u64::MAX),
        ] {
            let id = primary_rule_id(domain, millis);
            assert!(id >= 1 && id < RULE_ID_SPACE, "id {} out of range", id);
        }
    }

    #[test]
    fn primary_id_is_deterministic_for_fixed_clock() {
        let first = primary_rule_id("facebook.com", 123_456_789);
        let second = primary_rule_id("facebook.com", 123_456_789);
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_domains_usually_get_distinct_ids() {
        let millis = 1_722_000_000_000;
        let a = primary_rule_id("facebook.com", millis);
        let b = primary_rule_id("reddit.com", millis);
        assert_ne!(a, b);
    }

    #[test]
    fn fallback_id_stays_in_engine_space() {
        for random in [0u32, 9_999, u32::MAX] {
            let id = fallback_rule_id(u64::MAX, random, 255);
            assert!(id >= 1 && id < RULE_ID_SPACE);
        }
    }

    #[test]
    fn fallback_differs_from_primary_under_collision_conditions() {
        let millis = 987_654_321;
        let primary = primary_rule_id("facebook.com", millis);
        let fallback = fallback_rule_id(millis, 4_242, "facebook.com".len());
        assert_ne!(primary, fallback);
    }

    #[test]
    fn ids_are_never_zero() {
        // rolling_hash("") == 0 and millis 0 would otherwise produce 0
        assert_eq!(primary_rule_id("", 0), 1);
        assert_eq!(fallback_rule_id(0, 0, 0), 1);
    }
}
