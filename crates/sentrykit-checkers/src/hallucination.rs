//! Claim verification checker: fetch each claim's evidence URLs and
//! confirm its extraction still holds against the fetched document.

use crate::extract;
use crate::web::Fetcher;
use sentrykit_core::error::{CheckerError, ExtractError};
use sentrykit_core::evidence::EvidenceMap;
use sentrykit_core::model::{Claim, ExtractionKind, Finding, RunInput, Severity};
use sentrykit_core::redact::redact_str;

fn validate_contains(document: &str, pattern: &str, must_include: Option<&str>) -> bool {
    let probe = must_include.unwrap_or(pattern);
    document.to_lowercase().contains(&probe.to_lowercase())
}

fn apply_extraction(claim: &Claim, document: &str) -> Result<bool, ExtractError> {
    let extraction = &claim.extraction;
    let must_include = extraction.must_include.as_deref();
    match extraction.kind {
        ExtractionKind::Css => {
            let text = extract::extract_css(document, &extraction.pattern, must_include)?;
            let target = must_include.unwrap_or(extraction.pattern.as_str());
            Ok(text.to_lowercase().contains(&target.to_lowercase()))
        }
        ExtractionKind::Xpath => {
            let text = extract::extract_xpath(document, &extraction.pattern, must_include)?;
            let target = must_include.unwrap_or(extraction.pattern.as_str());
            Ok(text.to_lowercase().contains(&target.to_lowercase()))
        }
        ExtractionKind::Regex => {
            let text = extract::extract_regex(document, &extraction.pattern)?;
            if let Some(needle) = must_include {
                if !text.to_lowercase().contains(&needle.to_lowercase()) {
                    return Err(ExtractError::new("Regex extraction missing required snippet"));
                }
            }
            Ok(true)
        }
        ExtractionKind::Contains => Ok(validate_contains(document, &extraction.pattern, must_include)),
    }
}

fn verify_claim(claim: &Claim, fetcher: &dyn Fetcher) -> (bool, Vec<String>) {
    let mut errors = Vec::new();
    if claim.evidence_urls.is_empty() {
        return (false, vec!["no_evidence_urls".to_string()]);
    }
    for url in &claim.evidence_urls {
        let document = match fetcher.fetch(url) {
            Ok(doc) => doc,
            Err(err) => {
                errors.push(format!("fetch_error:{err}"));
                tracing::debug!(url, error = %err, "claim_fetch_error");
                continue;
            }
        };
        match apply_extraction(claim, &document) {
            Ok(true) => return (true, Vec::new()),
            Ok(false) => {}
            Err(err) => {
                errors.push(format!("parse_error:{err}"));
                tracing::debug!(url, error = %err, pattern = claim.extraction.pattern, "claim_extraction_error");
            }
        }
    }
    (false, errors)
}

/// Verify every claim in the run's output against its evidence URLs,
/// emitting a finding for each claim that cannot be substantiated.
pub fn run(run: &RunInput, fetcher: &dyn Fetcher) -> Result<Vec<Finding>, CheckerError> {
    let Some(output) = &run.output else { return Ok(Vec::new()) };
    if output.claims.is_empty() {
        return Ok(Vec::new());
    }

    let mut findings = Vec::new();
    for claim in &output.claims {
        let (valid, errors) = verify_claim(claim, fetcher);
        if valid {
            continue;
        }
        let statement = redact_str(&claim.statement);
        let redacted_errors: Vec<String> =
            errors.into_iter().take(3).map(|e| redact_str(&e)).collect();
        findings.push(
            Finding::new(
                "hallucination",
                Severity::High,
                format!("Claim lacks verifiable evidence: {statement}"),
            )
            .with_evidence(
                EvidenceMap::new()
                    .with("statement", statement)
                    .with("urls", claim.evidence_urls.clone())
                    .with("errors", redacted_errors),
            ),
        );
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentrykit_core::error::NetworkError;
    use sentrykit_core::model::{Extraction, RunOutput};

    fn claim(statement: &str, url: &str, extraction: Extraction) -> Claim {
        Claim { statement: statement.to_string(), evidence_urls: vec![url.to_string()], extraction }
    }

    #[test]
    fn claim_with_no_evidence_urls_is_flagged() {
        let run = RunInput {
            output: Some(RunOutput {
                text: String::new(),
                claims: vec![Claim {
                    statement: "Unsupported claim".to_string(),
                    evidence_urls: vec![],
                    extraction: Extraction::contains("anything", None),
                }],
            }),
            ..Default::default()
        };
        let fetcher = |_: &str| -> Result<String, NetworkError> { Ok(String::new()) };
        let findings = run(&run, &fetcher).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].evidence.get("errors").is_some());
    }

    #[test]
    fn claim_verified_by_contains_extraction_produces_no_finding() {
        let run = RunInput {
            output: Some(RunOutput {
                text: String::new(),
                claims: vec![claim(
                    "The role pays $6000 per month",
                    "https://example.com/job",
                    Extraction::contains("$6000 per month", None),
                )],
            }),
            ..Default::default()
        };
        let fetcher =
            |_: &str| -> Result<String, NetworkError> { Ok("Salary: $6000 per month".to_string()) };
        assert!(run(&run, &fetcher).unwrap().is_empty());
    }

    #[test]
    fn fetch_failure_is_recorded_and_claim_flagged() {
        let run = RunInput {
            output: Some(RunOutput {
                text: String::new(),
                claims: vec![claim(
                    "The role pays $6000 per month",
                    "https://example.com/job",
                    Extraction::contains("$6000 per month", None),
                )],
            }),
            ..Default::default()
        };
        let fetcher = |url: &str| -> Result<String, NetworkError> {
            Err(NetworkError { url: url.to_string(), message: "timed out".to_string() })
        };
        let findings = run(&run, &fetcher).unwrap();
        assert_eq!(findings.len(), 1);
        let errors = findings[0].evidence.get("errors").unwrap();
        if let sentrykit_core::evidence::EvidenceValue::List(items) = errors {
            assert!(items[0].as_str().unwrap().starts_with("fetch_error:"));
        } else {
            panic!("expected list evidence");
        }
    }

    #[test]
    fn no_output_yields_no_findings() {
        let run = RunInput::default();
        let fetcher = |_: &str| -> Result<String, NetworkError> { Ok(String::new()) };
        assert!(run(&run, &fetcher).unwrap().is_empty());
    }
}
