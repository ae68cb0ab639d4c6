//! Guardrail policy configuration.
//!
//! `BTreeSet` is used for every set-valued field (rather than
//! `HashSet`) so (de)serialization is stable and diffable: two policies
//! with the same members always serialize to the same sorted-list JSON,
//! which keeps config diffs and snapshot tests meaningful.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Immutable configuration consumed by the engine and its checkers.
///
/// A `Policy` is constructed once per evaluation and never mutated; the
/// engine and every checker treat it as read-only, which is what makes
/// sharing one `Policy` (and one `Engine`) across concurrent evaluations
/// safe (see the crate's concurrency notes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Tool identifiers allowed to be called. Empty disables the
    /// tool-firewall checker.
    pub allowed_tool_names: BTreeSet<String>,
    /// Normalized domains tool calls are allowed to reference. Empty
    /// disables the off-policy domain scan.
    pub allowed_url_domains: BTreeSet<String>,
    /// Consumed by adapters, not by this crate's engine; stored only so
    /// policies round-trip losslessly.
    pub require_claims: bool,
    /// Block-rule match keys (see the engine's block-key algebra).
    pub block_on: BTreeSet<String>,
    /// Minimum acceptable staff count extracted from text, if any.
    pub min_company_size: Option<i64>,
    /// Minimum acceptable monthly pay extracted from text, if any.
    pub min_pay_threshold: Option<i64>,
    /// Downgrade an Austin-metro location finding from high to medium
    /// severity when the goal asked for Austin.
    pub treat_metro_as_minor: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allowed_tool_names: BTreeSet::new(),
            allowed_url_domains: BTreeSet::new(),
            require_claims: true,
            block_on: BTreeSet::new(),
            min_company_size: None,
            min_pay_threshold: None,
            treat_metro_as_minor: true,
        }
    }
}

impl Policy {
    /// Construct a `Policy` with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to a JSON-friendly value with sorted sets, for stable
    /// config diffs.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("Policy serializes infallibly")
    }

    /// Deserialize from a JSON-friendly value. Missing fields fall back
    /// to their defaults.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
