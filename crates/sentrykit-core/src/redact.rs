//! The redaction filter applied to every externally visible string.
//!
//! Uses the same regex set as the leak checker's secret scan: an
//! OpenAI-style `sk-` key, AWS `AKIA`/`ASIA` access key ids, an `ssh-rsa`
//! public key blob, and a PEM private-key block. Matches are masked
//! rather than dropped, so the shape of a leak is still visible in a
//! report without exposing the secret itself.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::evidence::EvidenceMap;

/// The secret patterns shared by the leak checker and this redaction
/// filter. Order matters: patterns are applied left-to-right, and a
/// later pattern can still match text a mask produced by an earlier one
/// left behind.
pub static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)sk-[a-z0-9]{16,}").unwrap(),
        Regex::new(r"AKIA[0-9A-Z]{16}").unwrap(),
        Regex::new(r"ASIA[0-9A-Z]{16}").unwrap(),
        Regex::new(r"ssh-rsa [A-Za-z0-9+/=]{40,}").unwrap(),
        Regex::new(r"-----BEGIN [A-Z ]+PRIVATE KEY-----[\s\S]+?-----END [A-Z ]+PRIVATE KEY-----")
            .unwrap(),
    ]
});

/// Borrow the canonical secret-pattern list.
#[must_use]
pub fn secret_patterns() -> &'static [Regex] {
    &SECRET_PATTERNS
}

/// Mask a matched secret: all-asterisks if short, else asterisks with
/// the last 4 characters preserved.
#[must_use]
fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= 8 {
        "*".repeat(len)
    } else {
        let tail: String = value.chars().skip(len - 4).collect();
        format!("{}{}", "*".repeat(len - 4), tail)
    }
}

/// Mask every secret-pattern match found in `text`.
#[must_use]
pub fn redact_str(text: &str) -> String {
    let mut redacted = text.to_string();
    for pattern in secret_patterns() {
        // Collect matches first: replacing in place while iterating a
        // live match cursor over `redacted` would invalidate it.
        let matches: Vec<String> =
            pattern.find_iter(&redacted).map(|m| m.as_str().to_string()).collect();
        for full in matches {
            let masked = mask(&full);
            redacted = redacted.replacen(&full, &masked, 1);
        }
    }
    redacted
}

/// Redact every string leaf of a [`Finding`](crate::model::Finding)'s
/// evidence tree, recursively.
pub fn redact_evidence(evidence: &mut EvidenceMap) {
    for (_, value) in &mut evidence.0 {
        value.walk_strings_mut(&mut |s| redact_str(s));
    }
}
