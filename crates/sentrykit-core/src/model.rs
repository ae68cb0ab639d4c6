//! Typed data model shared by every checker and by the engine:
//! `Extraction`, `Claim`, `ContextChunk`, `ToolCall`, `RunOutput`,
//! `RunInput`, `Finding`, `Report`, `Verdict`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::evidence::EvidenceMap;

/// Severity of a [`Finding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low severity; contributes 0.2 to the score.
    Low,
    /// Medium severity; contributes 0.5 to the score.
    Medium,
    /// High severity; contributes 1.0 to the score.
    High,
}

impl Severity {
    /// Score weight contributed by this severity.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.5,
            Self::High => 1.0,
        }
    }

    /// Lowercase string form, used in block-rule match keys and HTML
    /// `severity-<severity>` CSS classes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction strategy used to verify a [`Claim`] against fetched text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ExtractionKind {
    /// Limited CSS selector subset.
    Css,
    /// Limited XPath expression subset.
    Xpath,
    /// Plain regular expression.
    Regex,
    /// Case-insensitive substring containment.
    Contains,
}

/// A deterministic extraction strategy: what to look for, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Which extraction strategy to apply.
    pub kind: ExtractionKind,
    /// The selector/expression/pattern driving the strategy.
    pub pattern: String,
    /// Optional required substring the extracted text must contain.
    pub must_include: Option<String>,
}

impl Extraction {
    /// Construct a `contains` extraction.
    #[must_use]
    pub fn contains(pattern: impl Into<String>, must_include: Option<String>) -> Self {
        Self { kind: ExtractionKind::Contains, pattern: pattern.into(), must_include }
    }
}

/// A structured claim with ordered evidence URLs and an extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The human-readable assertion being made.
    pub statement: String,
    /// Ordered candidate URLs to verify the claim against.
    pub evidence_urls: Vec<String>,
    /// How to verify the claim once a document is fetched.
    pub extraction: Extraction,
}

/// A retrieved context chunk handed to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    /// Opaque identifier for where this chunk came from.
    pub source: String,
    /// The chunk's text content.
    pub text: String,
}

/// One tool invocation made during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier.
    pub name: String,
    /// Arguments passed to the tool, keyed by name.
    pub args: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    /// Fetch the `url` argument as a string, if present and string-typed.
    #[must_use]
    pub fn url_arg(&self) -> Option<&str> {
        self.args.get("url").and_then(serde_json::Value::as_str)
    }
}

/// The agent's final output: free text plus optional structured claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Free-text output.
    pub text: String,
    /// Structured claims extracted from (or alongside) the output text.
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl RunOutput {
    /// Construct an output with no claims.
    #[must_use]
    pub fn text_only(text: impl Into<String>) -> Self {
        Self { text: text.into(), claims: Vec::new() }
    }
}

/// A structured record of one agent invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunInput {
    /// Declared goal of the run.
    pub goal: String,
    /// Ordered list of declared constraints.
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Ordered (role, content) conversation messages; role is opaque.
    #[serde(default)]
    pub messages: Vec<(String, String)>,
    /// Retrieved context chunks.
    #[serde(default)]
    pub contexts: Vec<ContextChunk>,
    /// Tool calls made during the run.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// The agent's final output, if the run produced one.
    #[serde(default)]
    pub output: Option<RunOutput>,
}

/// One atomic observation produced by a checker.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Checker-defined kind, e.g. `"goal_drift"`, `"data_leak"`.
    pub kind: String,
    /// Severity of this observation.
    pub severity: Severity,
    /// Human-readable detail, already redacted before leaving the engine.
    pub details: String,
    /// Machine-readable evidence backing this observation.
    pub evidence: EvidenceMap,
}

impl Finding {
    /// Construct a finding with the given kind/severity/details and an
    /// empty evidence map, ready to be built up with `.with_evidence`.
    #[must_use]
    pub fn new(kind: impl Into<String>, severity: Severity, details: impl Into<String>) -> Self {
        Self { kind: kind.into(), severity, details: details.into(), evidence: EvidenceMap::new() }
    }

    /// Builder-style evidence attachment.
    #[must_use]
    pub fn with_evidence(mut self, evidence: EvidenceMap) -> Self {
        self.evidence = evidence;
        self
    }

    /// The `classification` evidence entry, if present and string-typed.
    #[must_use]
    pub fn classification(&self) -> Option<&str> {
        self.evidence.get_str("classification")
    }
}

/// A rendered report: sanitized HTML plus the structured summary it was
/// built from.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Rendered HTML report body.
    pub html: String,
    /// Structured summary serialized from the verdict.
    pub data: serde_json::Value,
}

/// The aggregate result of one `evaluate` call.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// Whether the policy's block rule fired.
    pub blocked: bool,
    /// `"No findings"`, or the sorted-unique set of finding kinds joined
    /// by `"; "`.
    pub reason: String,
    /// Sum of severity weights across all findings.
    pub score: f64,
    /// Findings in checker order, then scan order within each checker.
    pub findings: Vec<Finding>,
    /// The rendered report, always present once `evaluate` returns.
    pub report: Report,
}
