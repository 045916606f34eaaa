//! Built-in rule-based policy evaluator for the logistics catalog.
//!
//! Confidence is read off the observation; advice comes from a short list
//! of per-tool rules. Rules are checked in order and the first match wins.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use synapse_config::PolicyConfig;
use synapse_core::action::Arguments;
use synapse_core::error::PolicyError;
use synapse_core::observation::Observation;
use synapse_core::policy::{PolicyEvaluator, PolicyRequest};

/// Merchant preparation time (minutes) above which a swap is suggested.
const LONG_PREP_MINUTES: f64 = 30.0;

/// Confidence for an observation with nothing notable in it.
const BASELINE_CONFIDENCE: f64 = 0.8;

pub struct HeuristicEvaluator {
    config: PolicyConfig,
}

impl HeuristicEvaluator {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    fn is_high_risk(&self, tool_name: &str) -> bool {
        self.config.high_risk_tools.iter().any(|t| t == tool_name)
    }

    /// Confidence implied by the observation alone.
    fn confidence_for(observation: &Observation) -> f64 {
        if observation.is_error() {
            return 0.1;
        }
        if let Some(c) = observation.get("confidence").and_then(Value::as_f64) {
            return c;
        }
        if field_str(observation, "recipient_response") == Some("no_response") {
            return 0.35;
        }
        if observation.get("available") == Some(&Value::Bool(false)) {
            return 0.2;
        }
        if observation.get("requires_permission") == Some(&Value::Bool(true)) {
            return 0.45;
        }
        if field_str(observation, "severity") == Some("major") {
            return 0.55;
        }
        BASELINE_CONFIDENCE
    }

    fn judge(&self, request: &PolicyRequest<'_>, confidence: f64) -> Advice {
        let obs = request.observation;
        let tool = request.tool_name;
        let routine_escalate = confidence < self.config.escalate_below;

        if let Some(reason) = obs.error_message() {
            return Advice::escalate(format!(
                "{tool} failed ({reason}); gather more information or try a different tool"
            ));
        }

        if tool == "issue_instant_refund" {
            let amount = obs.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
            if amount > self.config.refund_auto_approve_limit {
                return Advice::escalate(format!(
                    "refund of {amount} exceeds the auto-approval limit of {}; NEED HUMAN REVIEW",
                    self.config.refund_auto_approve_limit
                ));
            }
        }

        if self.is_high_risk(tool) && confidence < self.config.high_risk_min_confidence {
            let mut advice = Advice::escalate(format!(
                "{tool} is hard to reverse and confidence is {confidence:.2}; confirm with evidence first"
            ));
            if let Some(order_id) = request.args.get("order_id") {
                advice = advice.suggest("collect_evidence", Some(object([("order_id", order_id.clone())])));
            }
            return advice;
        }

        if field_str(obs, "recipient_response") == Some("no_response") {
            return Advice::escalate(
                "recipient did not respond; consider a parcel locker or a safe drop-off",
            )
            .suggest("find_nearby_locker", None);
        }

        if obs.get("requires_permission") == Some(&Value::Bool(true)) {
            return Advice::escalate(
                "drop-off requires recipient permission; do not leave the parcel without consent",
            );
        }

        if tool == "collect_evidence" {
            if let Some(evidence) = obs.get("evidence").filter(|e| !e.is_null()) {
                return Advice::new(routine_escalate, "evidence collected; analyze it before assigning fault")
                    .suggest("analyze_evidence", Some(object([("evidence", evidence.clone())])));
            }
        }

        if field_str(obs, "severity") == Some("major") {
            let delay = obs.get("delay_minutes").cloned().unwrap_or(Value::Null);
            let mut route_args = Map::new();
            for key in ["origin", "destination"] {
                if let Some(v) = request.args.get(key) {
                    route_args.insert(key.into(), v.clone());
                }
            }
            return Advice::new(
                routine_escalate,
                format!("major traffic with {delay} minutes of delay; consider an alternative route"),
            )
            .suggest(
                "calculate_alternative_route",
                (!route_args.is_empty()).then_some(route_args),
            );
        }

        if let Some(prep) = obs.get("prep_time_min").and_then(Value::as_f64) {
            if prep > LONG_PREP_MINUTES {
                return Advice::new(
                    routine_escalate,
                    format!("merchant prep time is {prep} minutes; consider a nearby merchant"),
                )
                .suggest("get_nearby_merchants", None);
            }
        }

        Advice::new(routine_escalate, if routine_escalate { "" } else { "proceed" })
    }
}

#[async_trait]
impl PolicyEvaluator for HeuristicEvaluator {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn estimate_confidence(
        &self,
        _tool_name: &str,
        _args: &Arguments,
        observation: &Observation,
    ) -> Result<Option<f64>, PolicyError> {
        Ok(Some(Self::confidence_for(observation)))
    }

    async fn advise(&self, request: PolicyRequest<'_>) -> Result<Value, PolicyError> {
        let confidence = request
            .confidence
            .unwrap_or(self.config.default_confidence);
        let advice = self.judge(&request, confidence);

        let mut out = json!({
            "confidence": confidence,
            "escalate": advice.escalate,
            "advice": advice.text,
        });
        if let Some(action) = advice.suggested_action {
            out["suggested_action"] = json!(action);
        }
        if let Some(args) = advice.suggested_args {
            out["suggested_args"] = Value::Object(args);
        }
        Ok(out)
    }
}

struct Advice {
    escalate: bool,
    text: String,
    suggested_action: Option<&'static str>,
    suggested_args: Option<Arguments>,
}

impl Advice {
    fn new(escalate: bool, text: impl Into<String>) -> Self {
        Self {
            escalate,
            text: text.into(),
            suggested_action: None,
            suggested_args: None,
        }
    }

    fn escalate(text: impl Into<String>) -> Self {
        Self::new(true, text)
    }

    fn suggest(mut self, action: &'static str, args: Option<Arguments>) -> Self {
        self.suggested_action = Some(action);
        self.suggested_args = args;
        self
    }
}

fn field_str<'a>(observation: &'a Observation, key: &str) -> Option<&'a str> {
    observation.get(key).and_then(Value::as_str)
}

fn object<const N: usize>(pairs: [(&str, Value); N]) -> Arguments {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
