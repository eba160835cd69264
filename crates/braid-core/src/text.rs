//! UTF-8–safe string truncation.
//!
//! `&str[..n]` panics when `n` falls inside a multi-byte character; these
//! helpers snap back to the nearest char boundary.

/// Longest prefix of `s` that is at most `max_bytes` bytes and does not
/// split a multi-byte character.
#[inline]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Count of Unicode scalar values in `s`.
///
/// Token estimation works in characters, not bytes, so CJK and emoji text
/// is not overcounted.
#[inline]
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_within_limit() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn ascii_truncated() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn zero_max() {
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn snaps_back_inside_multibyte() {
        // '世' is 3 bytes; cutting at byte 4 lands inside the second char
        let s = "a世b";
        assert_eq!(truncate_str(s, 2), "a");
        assert_eq!(truncate_str(s, 3), "a");
        assert_eq!(truncate_str(s, 4), "a世");
    }

    #[test]
    fn emoji_boundary() {
        let s = "hi🦀";
        assert_eq!(truncate_str(s, 3), "hi");
        assert_eq!(truncate_str(s, 5), "hi");
        assert_eq!(truncate_str(s, 6), "hi🦀");
    }

    #[test]
    fn char_count_multibyte() {
        assert_eq!(char_count("héllo"), 5);
        assert_eq!(char_count("你好🌍"), 3);
        assert_eq!(char_count(""), 0);
    }
}
