//! SentryKit core primitives and shared types.
//!
//! This crate holds the data model shared by every checker and by the
//! orchestrating engine (see `sentrykit-engine`): the `Policy` a caller
//! configures, the `RunInput` a caller submits, the `Finding`/`Verdict`
//! an evaluation produces, the redaction filter applied to any outward
//! string, and the URL normalizer used by the poisoning checker and the
//! hallucination checker alike.

#![deny(unsafe_code)]

/// Version of the SentryKit core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod evidence;
pub mod model;
pub mod policy;
pub mod redact;
pub mod urls;

pub use error::{CheckerError, ExtractError, NetworkError};
pub use evidence::EvidenceValue;
pub use model::{
    Claim, ContextChunk, Extraction, ExtractionKind, Finding, Report, RunInput, RunOutput,
    Severity, ToolCall, Verdict,
};
pub use policy::Policy;
pub use redact::redact_str;
pub use urls::domain_of;
