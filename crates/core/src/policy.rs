//! Policy evaluation — the confidence/risk signal attached to every outcome.
//!
//! The evaluator itself is opaque: it sees the tool name, the arguments,
//! the observation and (optionally) a precomputed confidence, and answers
//! with raw JSON. Turning that into a [`PolicyJudgment`] with all required
//! fields present is the adapter's job (see `synapse-policy`).
//!
//! Judgments are advisory. They are written into the transcript for the
//! next generation step to react to; nothing in the loop branches on them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::action::Arguments;
use crate::error::PolicyError;
use crate::observation::Observation;

/// Advice returned when evaluation itself fails.
pub const EVALUATION_FAILED_ADVICE: &str = "policy evaluation failed";

/// A normalized policy judgment for one dispatched directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyJudgment {
    /// Confidence that the step moved the scenario forward safely, in [0, 1]
    pub confidence: f64,

    /// Whether the next step should take a conservative path
    pub escalate: bool,

    /// Human-readable advice; never empty when `escalate` is set
    pub advice: String,

    /// A concrete next tool to consider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,

    /// Arguments for `suggested_action`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_args: Option<Arguments>,
}

impl PolicyJudgment {
    /// The maximally conservative judgment used when the evaluator fails.
    pub fn evaluation_failed() -> Self {
        Self {
            confidence: 0.0,
            escalate: true,
            advice: EVALUATION_FAILED_ADVICE.into(),
            suggested_action: None,
            suggested_args: None,
        }
    }

    /// Checks the structural invariants of a judgment.
    pub fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence) && (!self.escalate || !self.advice.trim().is_empty())
    }

    /// Compact JSON, as injected into the transcript.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
    }
}

/// Everything an evaluator is told about one dispatched directive.
#[derive(Debug, Clone, Copy)]
pub struct PolicyRequest<'a> {
    pub tool_name: &'a str,
    pub args: &'a Arguments,
    pub observation: &'a Observation,
    /// Confidence estimated ahead of the advice call, if any
    pub confidence: Option<f64>,
}

/// The external confidence/policy function.
///
/// Implementations must be safe to share across concurrent runs; they get
/// no per-run state.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// A short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Estimate confidence before advice is requested.
    ///
    /// Default implementation has no opinion.
    async fn estimate_confidence(
        &self,
        _tool_name: &str,
        _args: &Arguments,
        _observation: &Observation,
    ) -> std::result::Result<Option<f64>, PolicyError> {
        Ok(None)
    }

    /// Produce the raw judgment fields as a JSON object.
    async fn advise(
        &self,
        request: PolicyRequest<'_>,
    ) -> std::result::Result<serde_json::Value, PolicyError>;
}
