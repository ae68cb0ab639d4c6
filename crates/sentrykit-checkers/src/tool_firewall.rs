//! Tool-name allow-list enforcement.

use sentrykit_core::error::CheckerError;
use sentrykit_core::evidence::EvidenceMap;
use sentrykit_core::model::{Finding, RunInput, Severity};
use sentrykit_core::policy::Policy;

/// Emit a high-severity finding for every tool call whose name is not
/// in `policy.allowed_tool_names`. An empty allow-list disables the
/// check entirely (returns no findings).
pub fn run(run: &RunInput, policy: &Policy) -> Result<Vec<Finding>, CheckerError> {
    if policy.allowed_tool_names.is_empty() {
        return Ok(Vec::new());
    }
    Ok(run
        .tool_calls
        .iter()
        .filter(|call| !policy.allowed_tool_names.contains(&call.name))
        .map(|call| {
            Finding::new(
                "tool_firewall",
                Severity::High,
                format!("Tool {} not in allow-list", call.name),
            )
            .with_evidence(EvidenceMap::new().with("tool", call.name.as_str()))
        })
        .collect())
}
