//! Context poisoning detection: an override-phrase scan over retrieved
//! context chunks, plus an off-policy tool-call domain scan.

use sentrykit_core::error::CheckerError;
use sentrykit_core::evidence::EvidenceMap;
use sentrykit_core::model::{Finding, RunInput, Severity};
use sentrykit_core::policy::Policy;
use sentrykit_core::urls::domain_of;

/// Default override phrases scanned for in every context chunk.
pub const DEFAULT_OVERRIDE_PHRASES: &[&str] = &[
    "ignore previous instructions",
    "disregard policy",
    "override safety",
    "you are now evil",
    "reset your instructions",
];

/// Run both sub-scans with the default override phrase set.
pub fn run(run: &RunInput, policy: &Policy) -> Result<Vec<Finding>, CheckerError> {
    run_with_phrases(run, policy, DEFAULT_OVERRIDE_PHRASES)
}

/// Run both sub-scans with a caller-supplied override phrase set.
pub fn run_with_phrases(
    run: &RunInput,
    policy: &Policy,
    override_phrases: &[&str],
) -> Result<Vec<Finding>, CheckerError> {
    let mut findings = Vec::new();

    for chunk in &run.contexts {
        let lowered = chunk.text.to_lowercase();
        if let Some(phrase) = override_phrases.iter().find(|p| lowered.contains(&p.to_lowercase()))
        {
            findings.push(
                Finding::new(
                    "context_poisoning",
                    Severity::High,
                    format!("Context chunk {} contains override phrase", chunk.source),
                )
                .with_evidence(
                    EvidenceMap::new().with("phrase", *phrase).with("source", chunk.source.as_str()),
                ),
            );
        }
    }

    if !policy.allowed_url_domains.is_empty() {
        for call in &run.tool_calls {
            let Some(url) = call.url_arg() else { continue };
            let domain = domain_of(url);
            if !domain.is_empty() && !policy.allowed_url_domains.contains(&domain) {
                findings.push(
                    Finding::new(
                        "context_poisoning",
                        Severity::Medium,
                        format!("Tool call {} references off-policy domain {domain}", call.name),
                    )
                    .with_evidence(
                        EvidenceMap::new().with("tool", call.name.as_str()).with("domain", domain.as_str()),
                    ),
                );
            }
        }
    }

    Ok(findings)
}
