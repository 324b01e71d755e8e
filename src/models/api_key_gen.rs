use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// A freshly generated credential. `raw` is shown to the caller exactly once;
/// only `hash` is persisted.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    pub raw: String,
    pub hash: String,
    /// Leading characters of the raw key, safe to store and display.
    pub display_prefix: String,
}

/// Number of leading characters kept for identification in listings.
const DISPLAY_PREFIX_LEN: usize = 12;

/// Generate a new API key with the given kind prefix (`usr_`, `org_`, ...).
///
/// The random part carries 256 bits of entropy, base64url-encoded without
/// padding.
pub fn generate_key(prefix: &str) -> GeneratedKey {
    let mut rng = rand::thread_rng();
    let mut random_bytes = [0u8; 32];
    rng.fill(&mut random_bytes);

    let random_part = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes);
    let raw = format!("{}{}", prefix, random_part);
    let hash = hash_key(&raw);
    let display_prefix = raw[..raw.len().min(DISPLAY_PREFIX_LEN)].to_string();

    GeneratedKey {
        raw,
        hash,
        display_prefix,
    }
}

/// SHA-256 hash of a raw key, hex-encoded for storage.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a raw key against a stored hash in constant time.
#[allow(dead_code)] // Used in tests; public API for key verification
pub fn verify_key(raw_key: &str, stored_hash: &str) -> bool {
    let computed = hash_key(raw_key);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Constant-time prefix check. Takes the same time regardless of how many
/// characters match.
pub fn has_key_prefix(key: &str, expected_prefix: &str) -> bool {
    if key.len() < expected_prefix.len() {
        return false;
    }
    let key_prefix = &key.as_bytes()[..expected_prefix.len()];
    key_prefix.ct_eq(expected_prefix.as_bytes()).into()
}
