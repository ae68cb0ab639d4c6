//! Fixed-phrase jailbreak detection.

use sentrykit_core::error::CheckerError;
use sentrykit_core::evidence::EvidenceMap;
use sentrykit_core::model::{Finding, RunInput, Severity};

const JAILBREAK_PHRASES: &[&str] =
    &["do anything now", "devmode++", "unlock hidden mode", "no rules apply"];

/// Scan goal, constraints, message contents and output text (all
/// newline-joined and lowercased) for each fixed jailbreak phrase.
pub fn run(run: &RunInput) -> Result<Vec<Finding>, CheckerError> {
    let mut texts: Vec<&str> = Vec::new();
    texts.push(run.goal.as_str());
    texts.extend(run.constraints.iter().map(String::as_str));
    texts.extend(run.messages.iter().map(|(_, content)| content.as_str()));
    if let Some(output) = &run.output {
        texts.push(output.text.as_str());
    }
    let blob = texts.join("\n").to_lowercase();

    Ok(JAILBREAK_PHRASES
        .iter()
        .filter(|phrase| blob.contains(*phrase))
        .map(|phrase| {
            Finding::new("jailbreak", Severity::High, format!("Detected jailbreak directive: {phrase}"))
                .with_evidence(EvidenceMap::new().with("phrase", *phrase))
        })
        .collect())
}
