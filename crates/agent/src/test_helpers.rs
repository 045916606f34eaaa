//! Shared test helpers for runner tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use synapse_core::error::ProviderError;
use synapse_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

/// A mock provider that returns a sequence of scripted outputs.
///
/// Each call to `complete` returns the next output in the queue; once the
/// queue holds a single output it is repeated forever. Every prompt is
/// recorded for inspection.
pub struct ScriptedProvider {
    outputs: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(outputs: Vec<&str>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider that always answers with `output`.
    pub fn repeating(output: &str) -> Self {
        Self::new(vec![output])
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let mut outputs = self.outputs.lock().unwrap();
        let text = if outputs.len() > 1 {
            outputs.pop_front().unwrap()
        } else {
            outputs.front().cloned().unwrap_or_default()
        };
        Ok(make_response(&text))
    }
}

/// Succeeds `successes` times with `output`, then fails every call.
pub struct FailingAfterProvider {
    successes: usize,
    output: String,
    calls: Mutex<usize>,
}

impl FailingAfterProvider {
    pub fn new(successes: usize, output: &str) -> Self {
        Self {
            successes,
            output: output.into(),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Provider for FailingAfterProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls > self.successes {
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: "backend unavailable".into(),
            });
        }
        Ok(make_response(&self.output))
    }
}

/// Answers with a final plan naming the scenario found in the prompt.
pub struct EchoScenarioProvider;

#[async_trait::async_trait]
impl Provider for EchoScenarioProvider {
    fn name(&self) -> &str {
        "echo_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let scenario = request
            .prompt
            .lines()
            .find_map(|l| l.strip_prefix("Scenario: "))
            .unwrap_or_default()
            .to_string();
        // Yield so concurrent runs interleave.
        tokio::task::yield_now().await;
        Ok(make_response(&format!(
            "ACTION: notify_customer({{\"message\": \"{scenario}\"}})\nFINAL_PLAN: handled {scenario}"
        )))
    }
}

/// Never answers.
pub struct HangingProvider;

#[async_trait::async_trait]
impl Provider for HangingProvider {
    fn name(&self) -> &str {
        "hanging_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Err(ProviderError::Network("unreachable".into()))
    }
}

pub fn make_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        text: text.into(),
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}
