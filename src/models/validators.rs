use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercase alphanumeric with hyphens, e.g. `acme-corp` or `log-retention`.
pub static SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("static regex"));

/// Usernames: alphanumeric plus `.`, `_`, `-`, must start with a letter.
pub static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9._-]*$").expect("static regex"));
