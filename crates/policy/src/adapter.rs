//! The policy adapter: evaluator invocation plus normalization.

use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use synapse_config::PolicyConfig;
use synapse_core::action::Arguments;
use synapse_core::error::PolicyError;
use synapse_core::observation::Observation;
use synapse_core::policy::{PolicyEvaluator, PolicyJudgment, PolicyRequest};
use tracing::{debug, warn};

/// Wraps a [`PolicyEvaluator`] so that every call yields a well-formed
/// [`PolicyJudgment`].
///
/// Stateless between calls; one adapter can serve any number of
/// concurrent runs.
#[derive(Clone)]
pub struct PolicyAdapter {
    evaluator: Arc<dyn PolicyEvaluator>,
    default_confidence: f64,
    escalate_below: f64,
}

impl PolicyAdapter {
    pub fn new(evaluator: Arc<dyn PolicyEvaluator>) -> Self {
        let defaults = PolicyConfig::default();
        Self {
            evaluator,
            default_confidence: defaults.default_confidence,
            escalate_below: defaults.escalate_below,
        }
    }

    pub fn from_config(evaluator: Arc<dyn PolicyEvaluator>, config: &PolicyConfig) -> Self {
        Self::new(evaluator)
            .with_default_confidence(config.default_confidence)
            .with_escalate_below(config.escalate_below)
    }

    /// Confidence used when neither the evaluator's output nor its
    /// estimate carries one.
    pub fn with_default_confidence(mut self, confidence: f64) -> Self {
        self.default_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Threshold below which a judgment without an explicit `escalate`
    /// is escalated.
    pub fn with_escalate_below(mut self, threshold: f64) -> Self {
        self.escalate_below = threshold;
        self
    }

    pub fn evaluator_name(&self) -> &str {
        self.evaluator.name()
    }

    /// Judge one dispatched directive. Never fails.
    ///
    /// Evaluator errors, panics and non-object output all collapse to
    /// [`PolicyJudgment::evaluation_failed`].
    pub async fn evaluate(
        &self,
        tool_name: &str,
        args: &Arguments,
        observation: &Observation,
    ) -> PolicyJudgment {
        let consulted = AssertUnwindSafe(self.consult(tool_name, args, observation))
            .catch_unwind()
            .await;

        let judgment = match consulted {
            Ok(Ok(judgment)) => judgment,
            Ok(Err(e)) => {
                warn!(tool = tool_name, evaluator = self.evaluator.name(), error = %e, "Policy evaluation failed");
                PolicyJudgment::evaluation_failed()
            }
            Err(_) => {
                warn!(tool = tool_name, evaluator = self.evaluator.name(), "Policy evaluator panicked");
                PolicyJudgment::evaluation_failed()
            }
        };

        debug!(
            tool = tool_name,
            confidence = judgment.confidence,
            escalate = judgment.escalate,
            "Policy judgment"
        );
        judgment
    }

    async fn consult(
        &self,
        tool_name: &str,
        args: &Arguments,
        observation: &Observation,
    ) -> Result<PolicyJudgment, PolicyError> {
        let precomputed = self
            .evaluator
            .estimate_confidence(tool_name, args, observation)
            .await?;

        let raw = self
            .evaluator
            .advise(PolicyRequest {
                tool_name,
                args,
                observation,
                confidence: precomputed,
            })
            .await?;

        self.normalize(raw, precomputed)
    }

    /// Fill in and clamp the fields of a raw evaluator result.
    pub fn normalize(
        &self,
        raw: Value,
        precomputed: Option<f64>,
    ) -> Result<PolicyJudgment, PolicyError> {
        let mut fields = match raw {
            Value::Object(fields) => fields,
            other => {
                return Err(PolicyError::InvalidJudgment(format!(
                    "expected a JSON object, got {other}"
                )));
            }
        };

        let confidence = fields
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite())
            .or(precomputed.filter(|c| c.is_finite()))
            .unwrap_or(self.default_confidence)
            .clamp(0.0, 1.0);

        let escalate = fields
            .get("escalate")
            .and_then(Value::as_bool)
            .unwrap_or(confidence < self.escalate_below);

        let mut advice = fields
            .get("advice")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if escalate && advice.is_empty() {
            advice = format!(
                "confidence {confidence:.2} is low; gather more information or take a conservative step"
            );
        }

        let suggested_action = fields
            .get("suggested_action")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let suggested_args = match fields.remove("suggested_args") {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };

        Ok(PolicyJudgment {
            confidence,
            escalate,
            advice,
            suggested_action,
            suggested_args,
        })
    }
}

impl std::fmt::Debug for PolicyAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyAdapter")
            .field("evaluator", &self.evaluator_name())
            .field("default_confidence", &self.default_confidence)
            .field("escalate_below", &self.escalate_below)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    /// Returns a fixed raw judgment and an optional precomputed confidence.
    struct FixedEvaluator {
        estimate: Option<f64>,
        raw: Value,
    }

    #[async_trait]
    impl PolicyEvaluator for FixedEvaluator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn estimate_confidence(
            &self,
            _tool_name: &str,
            _args: &Arguments,
            _observation: &Observation,
        ) -> Result<Option<f64>, PolicyError> {
            Ok(self.estimate)
        }

        async fn advise(&self, _request: PolicyRequest<'_>) -> Result<Value, PolicyError> {
            Ok(self.raw.clone())
        }
    }

    struct FailingEvaluator;

    #[async_trait]
    impl PolicyEvaluator for FailingEvaluator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn advise(&self, _request: PolicyRequest<'_>) -> Result<Value, PolicyError> {
            Err(PolicyError::EvaluatorFailed {
                evaluator: "failing".into(),
                reason: "model offline".into(),
            })
        }
    }

    struct PanickingEvaluator;

    #[async_trait]
    impl PolicyEvaluator for PanickingEvaluator {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn advise(&self, _request: PolicyRequest<'_>) -> Result<Value, PolicyError> {
            panic!("threshold table missing");
        }
    }

    fn adapter(estimate: Option<f64>, raw: Value) -> PolicyAdapter {
        PolicyAdapter::new(Arc::new(FixedEvaluator { estimate, raw }))
    }

    async fn judge(adapter: &PolicyAdapter) -> PolicyJudgment {
        adapter
            .evaluate("check_traffic", &Arguments::new(), &Observation::new())
            .await
    }

    #[tokio::test]
    async fn complete_judgment_passes_through() {
        let a = adapter(
            None,
            json!({
                "confidence": 0.8,
                "escalate": false,
                "advice": "proceed",
                "suggested_action": "calculate_alternative_route",
                "suggested_args": {"origin": "A", "destination": "D"}
            }),
        );
        let j = judge(&a).await;
        assert_eq!(j.confidence, 0.8);
        assert!(!j.escalate);
        assert_eq!(j.advice, "proceed");
        assert_eq!(j.suggested_action.as_deref(), Some("calculate_alternative_route"));
        assert_eq!(j.suggested_args.unwrap()["origin"], "A");
    }

    #[tokio::test]
    async fn precomputed_confidence_fills_gap() {
        let j = judge(&adapter(Some(0.7), json!({"advice": "ok"}))).await;
        assert_eq!(j.confidence, 0.7);
        assert!(!j.escalate);
    }

    #[tokio::test]
    async fn missing_confidence_uses_conservative_default() {
        let j = judge(&adapter(None, json!({}))).await;
        assert_eq!(j.confidence, 0.3);
        assert!(j.escalate);
        assert!(!j.advice.is_empty());
        assert!(j.is_well_formed());
    }

    #[tokio::test]
    async fn raw_confidence_wins_over_estimate() {
        let j = judge(&adapter(Some(0.9), json!({"confidence": 0.2, "advice": "risky"}))).await;
        assert_eq!(j.confidence, 0.2);
        assert!(j.escalate);
        assert_eq!(j.advice, "risky");
    }

    #[test]
    fn evaluator_name_comes_from_evaluator() {
        let adapter = PolicyAdapter::new(Arc::new(PanickingEvaluator));
        assert_eq!(adapter.evaluator_name(), "panicking");
        assert!(format!("{adapter:?}").contains("panicking"));
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let j = judge(&adapter(None, json!({"confidence": 1.7}))).await;
        assert_eq!(j.confidence, 1.0);
        let j = judge(&adapter(None, json!({"confidence": -3}))).await;
        assert_eq!(j.confidence, 0.0);
    }

    #[tokio::test]
    async fn non_numeric_confidence_is_ignored() {
        let j = judge(&adapter(Some(0.6), json!({"confidence": "high"}))).await;
        assert_eq!(j.confidence, 0.6);
    }

    #[tokio::test]
    async fn non_finite_estimate_falls_back_to_default() {
        let j = judge(&adapter(Some(f64::NAN), json!({}))).await;
        assert_eq!(j.confidence, 0.3);
    }

    #[tokio::test]
    async fn explicit_escalate_gets_advice() {
        let j = judge(&adapter(None, json!({"confidence": 0.95, "escalate": true}))).await;
        assert!(j.escalate);
        assert!(!j.advice.trim().is_empty());
    }

    #[tokio::test]
    async fn malformed_suggestions_are_dropped() {
        let j = judge(&adapter(
            None,
            json!({"confidence": 0.9, "suggested_action": "  ", "suggested_args": ["a"]}),
        ))
        .await;
        assert!(j.suggested_action.is_none());
        assert!(j.suggested_args.is_none());
    }

    #[tokio::test]
    async fn non_object_output_is_evaluation_failure() {
        let j = judge(&adapter(None, json!("looks fine"))).await;
        assert_eq!(j, PolicyJudgment::evaluation_failed());
    }

    #[tokio::test]
    async fn evaluator_error_is_evaluation_failure() {
        let a = PolicyAdapter::new(Arc::new(FailingEvaluator));
        let j = judge(&a).await;
        assert_eq!(j.confidence, 0.0);
        assert!(j.escalate);
        assert_eq!(j.advice, "policy evaluation failed");
    }

    #[tokio::test]
    async fn evaluator_panic_is_evaluation_failure() {
        let a = PolicyAdapter::new(Arc::new(PanickingEvaluator));
        let j = judge(&a).await;
        assert_eq!(j, PolicyJudgment::evaluation_failed());
    }

    #[tokio::test]
    async fn thresholds_follow_config() {
        let config = PolicyConfig {
            default_confidence: 0.6,
            escalate_below: 0.7,
            ..PolicyConfig::default()
        };
        let a = PolicyAdapter::from_config(
            Arc::new(FixedEvaluator { estimate: None, raw: json!({}) }),
            &config,
        );
        let j = judge(&a).await;
        assert_eq!(j.confidence, 0.6);
        assert!(j.escalate);
    }
}
