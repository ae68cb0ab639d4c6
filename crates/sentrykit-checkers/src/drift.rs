//! Goal drift detection heuristics: location, timeframe, pay and
//! company-size comparisons between the stated goal/constraints and
//! the observed output.

use once_cell::sync::Lazy;
use regex::Regex;
use sentrykit_core::error::CheckerError;
use sentrykit_core::evidence::EvidenceMap;
use sentrykit_core::model::{Finding, RunInput, Severity};
use sentrykit_core::policy::Policy;
use std::collections::BTreeSet;

static LOCATION_KEYWORDS: Lazy<Vec<(&'static str, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        ("austin", &["austin", "austin, tx", "austin texas", "atx", "austin metro"]),
        ("dallas", &["dallas", "dallas, tx", "dfw", "dallas metro"]),
        ("round rock", &["round rock"]),
        ("cedar park", &["cedar park"]),
        ("pflugerville", &["pflugerville"]),
        ("leander", &["leander"]),
        ("remote", &["remote", "work from anywhere"]),
    ]
});

const AUSTIN_METRO: &[&str] = &["round rock", "cedar park", "pflugerville", "leander"];

static SEASON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(spring|summer|fall|autumn|winter)\s+(20\d{2})").unwrap());
static PAY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$?([0-9]{1,3}(?:,[0-9]{3})*|[0-9]{4,})\s*(?:per\s*month|/month|monthly|a month)")
        .unwrap()
});
static COMPANY_SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{2,})\s*(?:\+\s*)?(?:employees|people|staff)\b").unwrap());

fn extract_locations(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    LOCATION_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(canonical, _)| (*canonical).to_string())
        .collect()
}

fn extract_timeframes(text: &str) -> BTreeSet<String> {
    SEASON_PATTERN
        .captures_iter(text)
        .map(|c| format!("{} {}", &c[1], &c[2]).to_lowercase())
        .collect()
}

fn extract_pay(text: &str) -> Option<i64> {
    let caps = PAY_PATTERN.captures(text)?;
    caps[1].replace(',', "").parse().ok()
}

fn extract_company_size(text: &str) -> Option<i64> {
    let caps = COMPANY_SIZE_PATTERN.captures(text)?;
    caps[1].parse().ok()
}

enum Classification {
    Major,
    Minor,
}

impl Classification {
    fn label(&self) -> &'static str {
        match self {
            Classification::Major => "major",
            Classification::Minor => "minor",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            Classification::Major => Severity::High,
            Classification::Minor => Severity::Medium,
        }
    }
}

fn classify_location(
    desired: &BTreeSet<String>,
    observed: &BTreeSet<String>,
    treat_metro_minor: bool,
) -> Option<(Classification, BTreeSet<String>)> {
    if desired.is_empty() || observed.is_empty() {
        return None;
    }

    let mut disallowed: BTreeSet<String> = BTreeSet::new();
    let mut minor_hits: BTreeSet<String> = BTreeSet::new();

    for location in observed {
        if desired.contains(location) {
            continue;
        }
        let is_minor = treat_metro_minor
            && desired.contains("austin")
            && AUSTIN_METRO.contains(&location.as_str());
        if is_minor {
            minor_hits.insert(location.clone());
        } else {
            disallowed.insert(location.clone());
        }
    }

    if !disallowed.is_empty() {
        return Some((Classification::Major, disallowed));
    }
    if !minor_hits.is_empty() {
        return Some((Classification::Minor, minor_hits));
    }
    None
}

fn sorted_list(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// Evaluate goal drift against the provided run, honoring the
/// policy's metro-leniency flag and optional pay/company-size floors.
pub fn run(run: &RunInput, policy: &Policy) -> Result<Vec<Finding>, CheckerError> {
    let baseline_text = {
        let mut parts = vec![run.goal.as_str()];
        parts.extend(run.constraints.iter().map(String::as_str));
        parts.join(" ")
    };
    let output_text = run.output.as_ref().map(|o| o.text.as_str()).unwrap_or_default();

    let mut findings = Vec::new();

    let desired_locations = extract_locations(&baseline_text);
    let observed_locations = extract_locations(output_text);
    if let Some((classification, offending)) =
        classify_location(&desired_locations, &observed_locations, policy.treat_metro_as_minor)
    {
        findings.push(
            Finding::new(
                "goal_drift",
                classification.severity(),
                "Response references disallowed location(s)",
            )
            .with_evidence(
                EvidenceMap::new()
                    .with("expected", sorted_list(&desired_locations))
                    .with("observed", sorted_list(&observed_locations))
                    .with("classification", classification.label())
                    .with("offending", sorted_list(&offending)),
            ),
        );
    }

    let desired_timeframes = extract_timeframes(&baseline_text);
    let observed_timeframes = extract_timeframes(output_text);
    if !desired_timeframes.is_empty()
        && !observed_timeframes.is_empty()
        && desired_timeframes.is_disjoint(&observed_timeframes)
    {
        findings.push(
            Finding::new("goal_drift", Severity::High, "Response timeframe deviates from requested goal")
                .with_evidence(
                    EvidenceMap::new()
                        .with("expected", sorted_list(&desired_timeframes))
                        .with("observed", sorted_list(&observed_timeframes))
                        .with("classification", "major"),
                ),
        );
    }

    let effective_min_pay = policy.min_pay_threshold.or_else(|| extract_pay(&baseline_text));
    let observed_pay = extract_pay(output_text);
    if let (Some(min_pay), Some(pay)) = (effective_min_pay, observed_pay) {
        if pay < min_pay {
            findings.push(
                Finding::new(
                    "goal_drift",
                    Severity::High,
                    format!("Pay ${pay} below threshold ${min_pay}"),
                )
                .with_evidence(
                    EvidenceMap::new()
                        .with("expected_min", min_pay)
                        .with("observed", pay)
                        .with("classification", "major"),
                ),
            );
        }
    }

    let effective_company_size =
        policy.min_company_size.or_else(|| extract_company_size(&baseline_text));
    let observed_company_size = extract_company_size(output_text);
    if let (Some(min_size), Some(size)) = (effective_company_size, observed_company_size) {
        if size < min_size {
            findings.push(
                Finding::new("goal_drift", Severity::High, "Company size below requested minimum")
                    .with_evidence(
                        EvidenceMap::new()
                            .with("expected_min", min_size)
                            .with("observed", size)
                            .with("classification", "major"),
                    ),
            );
        }
    }

    Ok(findings)
}
