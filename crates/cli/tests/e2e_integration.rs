//! End-to-end integration tests for the Synapse orchestration runtime.
//!
//! These tests exercise the full pipeline from scenario text to final plan:
//! generation, action parsing, catalog dispatch, heuristic policy judgment
//! and transcript accumulation.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use synapse_agent::{RunError, RunOptions, ScenarioRunner, StopReason};
use synapse_config::AppConfig;
use synapse_core::error::ProviderError;
use synapse_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use synapse_policy::{HeuristicEvaluator, PolicyAdapter};
use synapse_providers::{ReplayProvider, RetryingProvider};
use synapse_tools::catalog_registry;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted outputs in sequence.
struct ScriptedProvider {
    outputs: Vec<String>,
    calls: std::sync::Mutex<usize>,
}

impl ScriptedProvider {
    fn new(outputs: &[&str]) -> Self {
        Self {
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            calls: std::sync::Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let text = self
            .outputs
            .get(*calls)
            .unwrap_or_else(|| panic!("ScriptedProvider exhausted: call #{}", *calls))
            .clone();
        *calls += 1;
        Ok(ProviderResponse {
            text,
            model: "mock".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }
}

/// Fails with a rate limit on the first call, then delegates.
struct RateLimitedOnce {
    inner: ScriptedProvider,
    tripped: std::sync::atomic::AtomicBool,
}

#[async_trait::async_trait]
impl Provider for RateLimitedOnce {
    fn name(&self) -> &str {
        "rate_limited_once"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if !self.tripped.swap(true, std::sync::atomic::Ordering::SeqCst) {
            return Err(ProviderError::RateLimited { retry_after_secs: 0 });
        }
        self.inner.complete(request).await
    }
}

/// Answers once, then reports a revoked key.
struct FailsAfterFirst(ScriptedProvider);

#[async_trait::async_trait]
impl Provider for FailsAfterFirst {
    fn name(&self) -> &str {
        "fails_after_first"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.0.calls() >= 1 {
            return Err(ProviderError::AuthenticationFailed("key revoked".into()));
        }
        self.0.complete(request).await
    }
}

fn runner(provider: Arc<dyn Provider>) -> ScenarioRunner {
    let config = AppConfig::default();
    let policy = PolicyAdapter::from_config(
        Arc::new(HeuristicEvaluator::new(config.policy.clone())),
        &config.policy,
    );
    ScenarioRunner::from_config(provider, Arc::new(catalog_registry()), policy, &config)
        .with_step_backoff(Duration::ZERO)
}

// ── E2E: Late merchant, swap and notify ─────────────────────────────────

#[tokio::test]
async fn e2e_late_merchant_switch() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "THOUGHT: check the kitchen first\nACTION: get_merchant_status({\"merchant_id\": \"m_88\"})",
        "THOUGHT: prep is long, policy suggests nearby merchants\nACTION: get_nearby_merchants({\"merchant_type\": \"indian\", \"location\": \"MG Road\"})",
        "THOUGHT: QuickBites is fast\nACTION: notify_customer({\"customer_id\": \"c_7\", \"message\": \"Switching to QuickBites, 15 min\"})\nFINAL_PLAN: Move order to QuickBites (m_102) and tell the customer.",
    ]));
    let result = runner(provider.clone())
        .run("Order #4521 from Spice Route is 40 minutes late")
        .await
        .unwrap();

    assert_eq!(provider.calls(), 3);
    assert_eq!(result.stop_reason, StopReason::FinalPlan);
    assert_eq!(result.final_plan, "Move order to QuickBites (m_102) and tell the customer.");

    let entries = result.transcript.entries();
    let first = &entries[0].outcomes[0];
    assert_eq!(first.observation.get("prep_time_min"), Some(&serde_json::json!(40)));
    assert_eq!(first.judgment.suggested_action.as_deref(), Some("get_nearby_merchants"));

    let text = result.transcript_text();
    assert!(text.contains("\"merchant_id\":\"m_102\""));
    assert!(text.contains("\"notified\":true"));
}

// ── E2E: Unresponsive recipient ─────────────────────────────────────────

#[tokio::test]
async fn e2e_unresponsive_recipient_escalates_to_locker() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "ACTION: contact_recipient_via_chat({\"recipient_id\": \"r_3\", \"message\": \"At your door\"})",
        "ACTION: find_nearby_locker({\"location\": \"Block C\"})\nFINAL_PLAN: Deliver to locker_77 and notify r_3.",
    ]));
    let result = runner(provider).run("Recipient not answering the door").await.unwrap();

    let chat = &result.transcript.entries()[0].outcomes[0];
    assert_eq!(chat.observation.get("recipient_response"), Some(&serde_json::json!("no_response")));
    assert!(chat.judgment.escalate);
    assert_eq!(chat.judgment.suggested_action.as_deref(), Some("find_nearby_locker"));

    let locker = &result.transcript.entries()[1].outcomes[0];
    assert!(!locker.judgment.escalate);
    assert_eq!(result.final_plan, "Deliver to locker_77 and notify r_3.");
}

// ── E2E: Dispute with a large refund ────────────────────────────────────

#[tokio::test]
async fn e2e_large_refund_is_flagged_but_executed() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "ACTION: collect_evidence({\"order_id\": \"o_9\"})\nACTION: issue_instant_refund({\"order_id\": \"o_9\", \"amount\": 120})",
        "FINAL_PLAN: Refund issued; NEED HUMAN REVIEW for the amount.",
    ]));
    let result = runner(provider).run("Spilled drink dispute").await.unwrap();

    let outcomes = &result.transcript.entries()[0].outcomes;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].judgment.suggested_action.as_deref(), Some("analyze_evidence"));

    let refund = &outcomes[1];
    assert_eq!(refund.observation.get("refund_issued"), Some(&serde_json::json!(true)));
    assert!(refund.judgment.escalate);
    assert!(refund.judgment.advice.contains("NEED HUMAN REVIEW"));
    assert!(result.final_plan.contains("NEED HUMAN REVIEW"));
}

// ── E2E: Faults folded into the transcript ──────────────────────────────

#[tokio::test]
async fn e2e_bad_directives_never_abort_the_run() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "ACTION: summon_drone({\"to\": \"roof\"})\nACTION: check_traffic({origin: A})\nACTION: check_flight_status({\"flight_number\": \"AI101\", \"gate\": 4})",
        "FINAL_PLAN: Proceed by road.",
    ]));
    let result = runner(provider).run("Airport pickup").await.unwrap();

    let outcomes = &result.transcript.entries()[0].outcomes;
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].observation.error_message(), Some("unknown tool summon_drone"));
    assert!(outcomes[1].args.is_empty());
    assert_eq!(outcomes[1].observation.get("severity"), Some(&serde_json::json!("major")));
    assert!(outcomes[2].observation.is_error());
    assert!(outcomes[2].observation.error_message().unwrap().contains("gate"));
    assert_eq!(result.final_plan, "Proceed by road.");
}

// ── E2E: Step budget ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_budget_exhaustion_without_plan() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "ACTION: check_traffic({\"origin\": \"A\", \"destination\": \"D\"})",
        "ACTION: calculate_alternative_route({\"origin\": \"A\", \"destination\": \"D\"})",
        "THOUGHT: still unsure",
    ]));
    let result = runner(provider.clone())
        .run_with("Highway closed", RunOptions { max_steps: Some(3), model: None })
        .await
        .unwrap();

    assert_eq!(provider.calls(), 3);
    assert_eq!(result.steps(), 3);
    assert_eq!(result.stop_reason, StopReason::StepBudgetExhausted);
    assert!(!result.has_final_plan());

    let route = &result.transcript.entries()[0].outcomes[0].judgment;
    assert_eq!(route.suggested_action.as_deref(), Some("calculate_alternative_route"));
}

// ── E2E: Backend failures ───────────────────────────────────────────────

#[tokio::test]
async fn e2e_backend_failure_returns_partial_transcript() {
    let provider = Arc::new(FailsAfterFirst(ScriptedProvider::new(&[
        "ACTION: get_merchant_status({\"merchant_id\": \"m_1\"})",
    ])));
    let err = runner(provider).run("Merchant slow").await.unwrap_err();

    let RunError::Generation { step, source, partial } = &err;
    assert_eq!(*step, 1);
    assert!(matches!(source, ProviderError::AuthenticationFailed(_)));
    assert_eq!(partial.steps(), 1);
    assert!(partial.transcript_text().contains("\"backlog\":12"));
}

#[tokio::test(start_paused = true)]
async fn e2e_transient_backend_error_is_retried() {
    let provider = RateLimitedOnce {
        inner: ScriptedProvider::new(&["FINAL_PLAN: all good"]),
        tripped: std::sync::atomic::AtomicBool::new(false),
    };
    let retrying = RetryingProvider::new(Arc::new(provider))
        .with_max_retries(2)
        .with_backoff(Duration::from_millis(10));

    let result = runner(Arc::new(retrying)).run("Anything").await.unwrap();
    assert_eq!(result.final_plan, "all good");
}

// ── E2E: Replay backend ─────────────────────────────────────────────────

#[tokio::test]
async fn e2e_replay_file_drives_a_full_run() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "THOUGHT: check the driver\nACTION: re_route_driver({{\"driver_id\": \"d_4\", \"new_route\": \"A->C->D\"}})\n---\nFINAL_PLAN: Driver d_4 rerouted via C.\n"
    )
    .unwrap();

    let provider = ReplayProvider::from_file(file.path()).unwrap();
    assert_eq!(provider.len(), 2);

    let result = runner(Arc::new(provider)).run("Road blocked at B").await.unwrap();
    assert_eq!(result.steps(), 2);
    assert_eq!(result.final_plan, "Driver d_4 rerouted via C.");
    assert!(result.transcript_text().contains("\"status\":\"assigned\""));
}

// ── E2E: Concurrency ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_concurrent_runs_share_runner() {
    let r = Arc::new(runner(Arc::new(ReplayProvider::new(vec![
        "FINAL_PLAN: first".into(),
        "FINAL_PLAN: second".into(),
    ]))));

    let a = tokio::spawn({
        let r = r.clone();
        async move { r.run("scenario one").await }
    });
    let b = tokio::spawn({
        let r = r.clone();
        async move { r.run("scenario two").await }
    });

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();

    let mut plans = vec![a.final_plan.clone(), b.final_plan.clone()];
    plans.sort();
    assert_eq!(plans, vec!["first", "second"]);
    assert!(a.transcript_text().contains("Scenario: scenario one"));
    assert!(!a.transcript_text().contains("scenario two"));
    assert!(b.transcript_text().contains("Scenario: scenario two"));
}

// ── E2E: Configuration System ───────────────────────────────────────────

#[test]
fn e2e_config_file_drives_runner_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(
        &path,
        "default_model = \"gemini-2.5-flash\"\n\n[runner]\nmax_steps = 3\nstep_backoff_ms = 0\n\n[policy]\nrefund_auto_approve_limit = 200.0\n",
    )
    .unwrap();

    let mut config = AppConfig::load_from(&path).unwrap();
    config.apply_env(|key| (key == "SYNAPSE_MODEL").then(|| "gemini-2.0-flash-lite".to_string()));

    assert_eq!(config.default_model, "gemini-2.0-flash-lite");
    assert_eq!(config.runner.max_steps, 3);
    assert_eq!(config.policy.refund_auto_approve_limit, 200.0);
}
