//! Simulated tools — deterministic stand-ins for logistics backends.
//!
//! Each catalog entry is a plain function from keyword arguments to an
//! observation. The handlers never fail; absent arguments take the
//! entry's default (null unless stated otherwise).

use async_trait::async_trait;
use serde_json::Value;
use synapse_core::action::Arguments;
use synapse_core::error::ToolError;
use synapse_core::observation::Observation;
use synapse_core::tool::Tool;

pub type Handler = fn(&Arguments) -> Observation;

/// A catalog entry backed by a pure handler function.
#[derive(Clone, Copy)]
pub struct SimulatedTool {
    name: &'static str,
    description: &'static str,
    parameters: &'static [&'static str],
    handler: Handler,
}

impl SimulatedTool {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        parameters: &'static [&'static str],
        handler: Handler,
    ) -> Self {
        Self {
            name,
            description,
            parameters,
            handler,
        }
    }

    /// Call the handler directly, bypassing registry validation.
    pub fn call(&self, args: &Arguments) -> Observation {
        (self.handler)(args)
    }
}

impl std::fmt::Debug for SimulatedTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedTool")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[async_trait]
impl Tool for SimulatedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters(&self) -> &[&str] {
        self.parameters
    }

    async fn execute(&self, args: &Arguments) -> Result<Observation, ToolError> {
        tracing::trace!(tool = self.name, "Simulated tool invoked");
        Ok(self.call(args))
    }
}

/// The argument value, or null when absent.
pub(crate) fn arg(args: &Arguments, key: &str) -> Value {
    args.get(key).cloned().unwrap_or(Value::Null)
}

/// The argument value, or `default` when absent. An explicit null is kept.
pub(crate) fn arg_or(args: &Arguments, key: &str, default: Value) -> Value {
    args.get(key).cloned().unwrap_or(default)
}

/// Render a value the way it reads when interpolated into a message:
/// strings bare, null as `None`, everything else as JSON.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Null => "None".into(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".into(),
        Value::Bool(false) => "False".into(),
        other => other.to_string(),
    }
}

/// Whether a value counts as "provided": not null, false, zero or empty.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
