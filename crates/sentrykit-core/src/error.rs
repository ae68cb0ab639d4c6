//! Error taxonomy shared across the evaluation engine: `NetworkError`
//! for fetch failures, `ExtractError` for HTML/regex extraction
//! failures, and `CheckerError` as the error a checker returns on
//! failure before the orchestrator converts it into an
//! `internal_error` finding.

use thiserror::Error;

/// Raised when an outbound evidence fetch fails after all retries.
#[derive(Debug, Error, Clone)]
#[error("failed to fetch {url}: {message}")]
pub struct NetworkError {
    /// URL that could not be fetched.
    pub url: String,
    /// Last underlying error observed.
    pub message: String,
}

/// Raised when HTML/regex extraction cannot produce a result.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct ExtractError(pub String);

impl ExtractError {
    /// Build an extraction error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Error a checker returns on failure.
///
/// The orchestrator in `sentrykit-engine` is the only consumer: it
/// converts this into a low-severity `internal_error` finding and
/// continues with the remaining checkers. Never surfaced to callers.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct CheckerError(pub String);

impl CheckerError {
    /// Build a checker error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<NetworkError> for CheckerError {
    fn from(e: NetworkError) -> Self {
        Self(e.to_string())
    }
}

impl From<ExtractError> for CheckerError {
    fn from(e: ExtractError) -> Self {
        Self(e.to_string())
    }
}

/// Raised by an embedding adapter when `verdict.blocked` is true.
///
/// The core never constructs this itself — adapters are out of scope
/// for this crate — but the type is exported so adapters share a
/// common vocabulary for surfacing policy violations.
#[derive(Debug, Error, Clone)]
#[error("policy violation: {reason}")]
pub struct PolicyViolation {
    /// Human-readable reason copied from `Verdict::reason`.
    pub reason: String,
}

/// Marker type for a missing third-party adapter dependency.
///
/// External to the core; exported only so the error taxonomy is
/// complete for adapters that choose to use it.
#[derive(Debug, Error, Clone)]
#[error("adapter missing: {0}")]
pub struct AdapterMissing(pub String);
