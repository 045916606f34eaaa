//! The orchestration loop: generate → parse → dispatch → judge → append.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use synapse_config::AppConfig;
use synapse_core::error::ProviderError;
use synapse_core::provider::{Provider, ProviderRequest};
use synapse_core::tool::ToolRegistry;
use synapse_policy::PolicyAdapter;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::parser::parse_actions;
use crate::prompt::SystemInstruction;
use crate::transcript::{FINAL_PLAN_MARKER, Outcome, Transcript};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model emitted a final-plan marker
    FinalPlan,
    /// The step limit was reached first
    StepBudgetExhausted,
    /// The generation backend failed; the run was cut short
    GenerationFailed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StopReason::FinalPlan => "final plan",
            StopReason::StepBudgetExhausted => "step budget exhausted",
            StopReason::GenerationFailed => "generation failed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Done(StopReason),
}

/// The outcome of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub scenario: String,
    pub model: String,
    pub transcript: Transcript,
    /// Empty when no plan was produced
    pub final_plan: String,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    fn finish(
        run_id: Uuid,
        scenario: &str,
        model: &str,
        transcript: Transcript,
        stop_reason: StopReason,
        started_at: DateTime<Utc>,
    ) -> Self {
        let final_plan = transcript.final_plan().unwrap_or_default().to_string();
        Self {
            run_id,
            scenario: scenario.to_string(),
            model: model.to_string(),
            transcript,
            final_plan,
            stop_reason,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// The full rendered transcript.
    pub fn transcript_text(&self) -> &str {
        self.transcript.render()
    }

    /// Number of generation blocks in the transcript.
    pub fn steps(&self) -> usize {
        self.transcript.len()
    }

    pub fn has_final_plan(&self) -> bool {
        !self.final_plan.is_empty()
    }
}

/// Run failures. Only the generation backend can fail a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("generation failed at step {step}: {source}")]
    Generation {
        /// 0-based step whose generation request failed
        step: usize,
        source: ProviderError,
        /// Everything recorded before the failure
        partial: Box<RunResult>,
    },
}

impl RunError {
    /// The transcript recorded up to the failure.
    pub fn partial(&self) -> &RunResult {
        match self {
            RunError::Generation { partial, .. } => partial,
        }
    }
}

/// Per-run overrides of the runner's defaults.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub max_steps: Option<usize>,
    pub model: Option<String>,
}

/// Drives scenario runs against a provider, a tool registry and a policy.
///
/// Holds no per-run state: `run` may be called concurrently.
pub struct ScenarioRunner {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    policy: PolicyAdapter,
    instruction: SystemInstruction,
    model: String,
    max_steps: usize,
    step_backoff: Duration,
    generation_timeout: Option<Duration>,
    max_tokens: Option<u32>,
}

impl ScenarioRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        policy: PolicyAdapter,
        model: impl Into<String>,
    ) -> Self {
        let instruction = SystemInstruction::for_registry(&tools);
        Self {
            provider,
            tools,
            policy,
            instruction,
            model: model.into(),
            max_steps: 6,
            step_backoff: Duration::from_millis(200),
            generation_timeout: Some(Duration::from_secs(60)),
            max_tokens: None,
        }
    }

    /// Build a runner with the `[runner]` settings of `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        policy: PolicyAdapter,
        config: &AppConfig,
    ) -> Self {
        let runner = &config.runner;
        let mut this = Self::new(provider, tools, policy, &config.default_model)
            .with_max_steps(runner.max_steps)
            .with_step_backoff(Duration::from_millis(runner.step_backoff_ms))
            .with_generation_timeout(
                (runner.generation_timeout_secs > 0)
                    .then(|| Duration::from_secs(runner.generation_timeout_secs)),
            );
        if let Some(max) = config.default_max_tokens {
            this = this.with_max_tokens(max);
        }
        if let Some(text) = &runner.system_instruction_override {
            this = this.with_instruction(SystemInstruction::custom(text));
        }
        this
    }

    /// Set the default number of generation steps per run.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    /// Set the pause between steps (zero disables it).
    pub fn with_step_backoff(mut self, backoff: Duration) -> Self {
        self.step_backoff = backoff;
        self
    }

    /// Set the per-step generation timeout (`None` waits indefinitely).
    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_instruction(mut self, instruction: SystemInstruction) -> Self {
        self.instruction = instruction;
        self
    }

    pub fn instruction(&self) -> &SystemInstruction {
        &self.instruction
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run `scenario` with the runner's defaults.
    pub async fn run(&self, scenario: &str) -> Result<RunResult, RunError> {
        self.run_with(scenario, RunOptions::default()).await
    }

    /// Run `scenario`, overriding step limit and model for this run only.
    pub async fn run_with(
        &self,
        scenario: &str,
        options: RunOptions,
    ) -> Result<RunResult, RunError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let max_steps = options.max_steps.unwrap_or(self.max_steps);
        let model = options.model.unwrap_or_else(|| self.model.clone());

        let mut transcript = Transcript::new(self.instruction.preamble(scenario));
        let mut state = RunState::Running;
        let mut step = 0usize;

        info!(
            run_id = %run_id,
            provider = self.provider.name(),
            policy = self.policy.evaluator_name(),
            model = %model,
            max_steps,
            "Starting scenario run"
        );

        while state == RunState::Running {
            if step >= max_steps {
                state = RunState::Done(StopReason::StepBudgetExhausted);
                break;
            }

            debug!(run_id = %run_id, step, prompt_chars = transcript.render().len(), "Requesting generation");

            let output = match self.generate(&model, transcript.render()).await {
                Ok(text) => text,
                Err(source) => {
                    warn!(run_id = %run_id, step, error = %source, "Generation failed, ending run");
                    let partial = RunResult::finish(
                        run_id,
                        scenario,
                        &model,
                        transcript,
                        StopReason::GenerationFailed,
                        started_at,
                    );
                    return Err(RunError::Generation {
                        step,
                        source,
                        partial: Box::new(partial),
                    });
                }
            };

            let block = output.trim().to_string();
            let mut outcomes = Vec::new();

            for directive in parse_actions(&block) {
                if let Some(reason) = &directive.args_error {
                    warn!(
                        run_id = %run_id,
                        step,
                        tool = %directive.tool,
                        reason = %reason,
                        "Malformed action arguments, dispatching with none"
                    );
                }

                let observation = self.tools.dispatch(&directive.tool, &directive.args).await;
                let judgment = self
                    .policy
                    .evaluate(&directive.tool, &directive.args, &observation)
                    .await;

                debug!(
                    run_id = %run_id,
                    step,
                    tool = %directive.tool,
                    error = observation.is_error(),
                    confidence = judgment.confidence,
                    escalate = judgment.escalate,
                    "Directive processed"
                );

                outcomes.push(Outcome {
                    tool: directive.tool,
                    args: directive.args,
                    observation,
                    judgment,
                });
            }

            let finished = block.contains(FINAL_PLAN_MARKER);
            transcript.append(block, outcomes);
            step += 1;

            if finished {
                state = RunState::Done(StopReason::FinalPlan);
            } else if step < max_steps && !self.step_backoff.is_zero() {
                tokio::time::sleep(self.step_backoff).await;
            }
        }

        let stop_reason = match state {
            RunState::Done(reason) => reason,
            RunState::Running => StopReason::StepBudgetExhausted,
        };
        let result = RunResult::finish(run_id, scenario, &model, transcript, stop_reason, started_at);

        info!(
            run_id = %run_id,
            steps = result.steps(),
            stop_reason = %result.stop_reason,
            has_final_plan = result.has_final_plan(),
            "Scenario run finished"
        );

        Ok(result)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let mut request = ProviderRequest::deterministic(model, prompt);
        request.max_tokens = self.max_tokens;

        let call = self.provider.complete(request);
        let response = match self.generation_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ProviderError::Timeout(format!(
                    "no response from '{}' within {limit:?}",
                    self.provider.name()
                ))
            })??,
            None => call.await?,
        };

        if let Some(usage) = &response.usage {
            debug!(model = %response.model, tokens = usage.total_tokens, "Generation complete");
        }
        Ok(response.text)
    }
}
