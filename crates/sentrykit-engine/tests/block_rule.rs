//! Block-key algebra and the empty-policy invariant.

use sentrykit_core::error::NetworkError;
use sentrykit_core::model::{RunInput, RunOutput};
use sentrykit_core::policy::Policy;
use sentrykit_engine::Engine;

fn empty_fetcher() -> Box<dyn sentrykit_checkers::Fetcher> {
    Box::new(|_: &str| -> Result<String, NetworkError> { Ok(String::new()) })
}

fn jailbreak_run() -> RunInput {
    RunInput { output: Some(RunOutput::text_only("No rules apply")), ..Default::default() }
}

#[test]
fn empty_block_on_never_blocks_regardless_of_findings() {
    let engine = Engine::with_fetcher(Policy::new(), empty_fetcher());
    let verdict = engine.evaluate(&jailbreak_run());
    assert!(!verdict.findings.is_empty());
    assert!(!verdict.blocked);
}

#[test]
fn block_on_bare_kind_matches() {
    let mut policy = Policy::new();
    policy.block_on.insert("jailbreak".to_string());
    let engine = Engine::with_fetcher(policy, empty_fetcher());
    assert!(engine.evaluate(&jailbreak_run()).blocked);
}

#[test]
fn block_on_severity_suffix_matches() {
    let mut policy = Policy::new();
    policy.block_on.insert("jailbreak:high".to_string());
    let engine = Engine::with_fetcher(policy, empty_fetcher());
    assert!(engine.evaluate(&jailbreak_run()).blocked);
}

#[test]
fn block_on_unrelated_key_does_not_match() {
    let mut policy = Policy::new();
    policy.block_on.insert("goal_drift:major".to_string());
    let engine = Engine::with_fetcher(policy, empty_fetcher());
    assert!(!engine.evaluate(&jailbreak_run()).blocked);
}

#[test]
fn evaluate_is_idempotent_for_identical_inputs() {
    let mut policy = Policy::new();
    policy.block_on.insert("jailbreak".to_string());
    let engine = Engine::with_fetcher(policy, empty_fetcher());
    let run = jailbreak_run();
    let first = engine.evaluate(&run);
    let second = engine.evaluate(&run);
    assert_eq!(first.blocked, second.blocked);
    assert!((first.score - second.score).abs() < f64::EPSILON);
}
