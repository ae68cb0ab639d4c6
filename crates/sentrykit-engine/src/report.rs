//! HTML report rendering for a [`Verdict`].
//!
//! Renders into a static template via placeholder substitution rather
//! than a templating engine: the template has exactly five slots, all
//! escaped before insertion.

use sentrykit_core::model::{Finding, Report};
use sentrykit_core::redact::{redact_evidence, redact_str};

const TEMPLATE: &str = include_str!("../templates/report.html");

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            map.iter().map(|(k, v)| format!("{k}: {}", stringify(v))).collect::<Vec<_>>().join(", ")
        }
        serde_json::Value::Array(items) => {
            items.iter().map(stringify).collect::<Vec<_>>().join(", ")
        }
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn sanitized_finding_json(finding: &Finding) -> serde_json::Value {
    let mut evidence = finding.evidence.clone();
    redact_evidence(&mut evidence);
    serde_json::json!({
        "kind": finding.kind,
        "severity": finding.severity.as_str(),
        "details": redact_str(&finding.details),
        "evidence": evidence,
    })
}

fn findings_section(findings_json: &[serde_json::Value]) -> String {
    if findings_json.is_empty() {
        return "<p>No findings.</p>".to_string();
    }
    let mut rows = String::new();
    for finding in findings_json {
        let kind = finding["kind"].as_str().unwrap_or_default();
        let severity = finding["severity"].as_str().unwrap_or_default();
        let details = finding["details"].as_str().unwrap_or_default();
        let evidence_items = finding["evidence"]
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(key, value)| {
                        format!(
                            "<li><strong>{}:</strong> {}</li>",
                            escape_html(key),
                            escape_html(&stringify(value))
                        )
                    })
                    .collect::<String>()
            })
            .unwrap_or_default();
        rows.push_str(&format!(
            "<tr><td>{}</td><td class='severity-{}'>{}</td><td>{}</td><td><ul>{}</ul></td></tr>",
            escape_html(kind),
            escape_html(severity),
            escape_html(&title_case(severity)),
            escape_html(details),
            evidence_items
        ));
    }
    format!(
        "<table><thead><tr><th>Kind</th><th>Severity</th><th>Details</th><th>Evidence</th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Render a structured HTML report plus its JSON summary for a
/// finished evaluation.
#[must_use]
pub fn render(blocked: bool, score: f64, reason: &str, findings: &[Finding]) -> Report {
    let findings_json: Vec<serde_json::Value> = findings.iter().map(sanitized_finding_json).collect();
    let reason_redacted = redact_str(reason);
    let data = serde_json::json!({
        "blocked": blocked,
        "score": score,
        "reason": reason_redacted,
        "findings": findings_json,
    });

    let status_class = if blocked { "blocked" } else { "allowed" };
    let status_text = if blocked { "Blocked" } else { "Allowed" };
    let html = TEMPLATE
        .replace("{{STATUS_CLASS}}", &escape_html(status_class))
        .replace("{{STATUS_TEXT}}", &escape_html(status_text))
        .replace("{{SCORE}}", &format!("{score:.2}"))
        .replace("{{REASON}}", &escape_html(&reason_redacted))
        .replace("{{FINDINGS_SECTION}}", &findings_section(&findings_json));

    Report { html, data }
}
