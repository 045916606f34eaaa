//! Tool trait — the abstraction over side-effecting catalog actions.
//!
//! Tools are what let the agent act on a scenario: check traffic, notify a
//! customer, issue a refund. Each tool declares its keyword parameters;
//! the registry validates incoming arguments against them before dispatch.

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use crate::action::Arguments;
use crate::error::ToolError;
use crate::observation::Observation;

/// A tool definition, as advertised to the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
///
/// Every catalog entry implements this. Tools are registered once in a
/// [`ToolRegistry`] and shared, read-only, by every run.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "check_traffic").
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// Declared keyword parameters, in signature order.
    ///
    /// Every parameter is optional; a missing one takes the tool's default.
    fn parameters(&self) -> &[&str];

    /// Execute the tool with already-validated arguments.
    async fn execute(&self, args: &Arguments) -> std::result::Result<Observation, ToolError>;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters()
            .iter()
            .map(|p| ((*p).to_string(), serde_json::json!({})))
            .collect();
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": []
        })
    }

    /// Call signature, e.g. `check_traffic(origin, destination)`.
    fn signature(&self) -> String {
        format!("{}({})", self.name(), self.parameters().join(", "))
    }

    /// Convert this tool into a ToolDefinition.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Built once at startup, then shared as `Arc<ToolRegistry>`; nothing
/// mutates it after that. Lookup order for listings is registration order.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name exists.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Call signatures of every tool, in registration order.
    pub fn signatures(&self) -> Vec<String> {
        self.iter().map(|t| t.signature()).collect()
    }

    /// Get all tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.iter().map(|t| t.to_definition()).collect()
    }

    fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name).map(|t| t.as_ref()))
    }

    /// Execute a tool call, reporting failures as typed errors.
    ///
    /// Arguments are checked against the declared parameters first. A
    /// panicking handler is reported as `ExecutionFailed`.
    pub async fn try_dispatch(
        &self,
        name: &str,
        args: &Arguments,
    ) -> std::result::Result<Observation, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        if let Some(unexpected) = args.keys().find(|k| !tool.parameters().contains(&k.as_str())) {
            return Err(ToolError::UnexpectedArgument {
                tool_name: name.to_string(),
                argument: unexpected.clone(),
            });
        }

        match AssertUnwindSafe(tool.execute(args)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(ToolError::ExecutionFailed {
                tool_name: name.to_string(),
                reason: format!("panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }

    /// Execute a tool call. Never fails: every problem becomes an
    /// `{"error": ...}` observation so the run can continue.
    pub async fn dispatch(&self, name: &str, args: &Arguments) -> Observation {
        match self.try_dispatch(name, args).await {
            Ok(observation) => {
                debug!(tool = name, fields = observation.len(), "Tool dispatched");
                observation
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Tool dispatch failed");
                Observation::error(e.to_string())
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
