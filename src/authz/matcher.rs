//! Segment-wise glob matching of request paths against rule patterns.
//!
//! A pattern segment `*` matches exactly one concrete segment. A trailing
//! `**` matches any number of remaining segments, including none, so
//! `/organizations/**` matches `/organizations` itself. `**` anywhere but
//! the final position never matches anything; the permission table rejects
//! such patterns at load time.

/// Split a path into its non-empty segments, tolerating leading, trailing,
/// and repeated slashes.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Match a concrete request path against a rule pattern. Case-sensitive.
pub fn path_matches(pattern: &str, path: &str) -> bool {
    let pattern: Vec<&str> = segments(pattern).collect();
    let concrete: Vec<&str> = segments(path).collect();

    for (idx, seg) in pattern.iter().enumerate() {
        if *seg == "**" {
            // Valid only as the final pattern segment; swallows the rest.
            return idx == pattern.len() - 1;
        }
        match concrete.get(idx) {
            Some(c) if *seg == "*" || seg == c => {}
            _ => return false,
        }
    }

    pattern.len() == concrete.len()
}

/// Whether a pattern is well-formed: `**` may only appear as the final
/// segment.
pub fn pattern_is_valid(pattern: &str) -> bool {
    let segs: Vec<&str> = segments(pattern).collect();
    segs.iter()
        .enumerate()
        .all(|(idx, s)| *s != "**" || idx == segs.len() - 1)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/health", "/health", true)]
    #[case("/health", "/healthz", false)]
    #[case("/health", "/health/live", false)]
    #[case("/users/*", "/users/alice", true)]
    #[case("/users/*", "/users", false)]
    #[case("/users/*", "/users/a/b", false)]
    #[case("/organizations/*/members/*", "/organizations/42/members/bob", true)]
    #[case("/organizations/*/members/*", "/organizations/42/members", false)]
    #[case("/organizations/**", "/organizations", true)]
    #[case("/organizations/**", "/organizations/a/b/c", true)]
    #[case("/services/**", "/contracts", false)]
    #[case("/", "/", true)]
    #[case("/**", "/anything/at/all", true)]
    #[case("/**", "/", true)]
    fn matching(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
        assert_eq!(path_matches(pattern, path), expected, "{pattern} vs {path}");
    }

    #[test]
    fn slashes_are_normalized() {
        assert!(path_matches("/users/*", "users/alice/"));
        assert!(path_matches("users/*", "//users//alice"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!path_matches("/Users/*", "/users/alice"));
    }

    #[test]
    fn interior_double_star_never_matches() {
        assert!(!path_matches("/a/**/b", "/a/x/b"));
        assert!(!path_matches("/a/**/b", "/a/b"));
    }

    #[test]
    fn pattern_validity() {
        assert!(pattern_is_valid("/a/*/b"));
        assert!(pattern_is_valid("/a/**"));
        assert!(pattern_is_valid("/**"));
        assert!(!pattern_is_valid("/a/**/b"));
        assert!(!pattern_is_valid("/**/b"));
    }

    #[test]
    fn without_double_star_lengths_must_agree() {
        // Patterns without `**` only ever match paths of equal segment count.
        for pattern in ["/a", "/a/*", "/a/*/c"] {
            for path in ["/a", "/a/b", "/a/b/c", "/a/b/c/d"] {
                let p_len = pattern.split('/').filter(|s| !s.is_empty()).count();
                let q_len = path.split('/').filter(|s| !s.is_empty()).count();
                if p_len != q_len {
                    assert!(!path_matches(pattern, path), "{pattern} vs {path}");
                }
            }
        }
    }
}
