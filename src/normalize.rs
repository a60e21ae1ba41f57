use once_cell::sync::Lazy;
use regex::Regex;

static RE_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    // ISO8601/RFC3339 with fractional seconds and numeric or Z offsets
    Regex::new(r"\b\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d{1,9})?(?:Z|[+-](?:\d{2}(?::?\d{2})?|\d{4}))\b").unwrap()
});

static RE_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b").unwrap()
});

static RE_IPV6: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b").unwrap()
});

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b").unwrap()
});

static RE_HEX: Lazy<Regex> = Lazy::new(|| {
    // Long hex runs only; short ones are likelier to be words
    Regex::new(r"\b[0-9a-fA-F]{16,}\b").unwrap()
});

static RE_FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b-?\d+\.\d+\b").unwrap());

static RE_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b-?\d+\b").unwrap());

/// Canonicalizing transform used for fuzzy equality at interior tree
/// nodes. Must be pure and idempotent: `normalize(normalize(t))` equals
/// `normalize(t)` for every token.
pub trait TokenNormalizer: Send + Sync {
    fn normalize(&self, token: &str) -> String;
}

/// Default canonicalizer: value-like spans collapse to a class marker and
/// the remainder is lowercased.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer;

impl TokenNormalizer for DefaultNormalizer {
    fn normalize(&self, token: &str) -> String {
        // Order matters: timestamps and addresses before bare numbers
        let s = RE_TIMESTAMP.replace_all(token, "<ts>");
        let s = RE_UUID.replace_all(&s, "<uuid>");
        let s = RE_IPV6.replace_all(&s, "<ip>");
        let s = RE_IPV4.replace_all(&s, "<ip>");
        let s = RE_HEX.replace_all(&s, "<hex>");
        let s = RE_FLOAT.replace_all(&s, "<num>");
        let s = RE_INT.replace_all(&s, "<num>");
        s.to_ascii_lowercase()
    }
}
