//! Observations — the structured result of executing a directive.
//!
//! An observation is always a flat JSON object. Failures are observations
//! too: `{"error": "<reason>"}`. The field names produced by tools are part
//! of the vocabulary the generation backend reads, so they are never renamed
//! on the way into the transcript.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Arguments;

const ERROR_KEY: &str = "error";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation(Arguments);

impl Observation {
    /// An empty observation.
    pub fn new() -> Self {
        Self::default()
    }

    /// An error-shaped observation: `{"error": reason}`.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::new().with(ERROR_KEY, reason.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether this observation carries an `error` key.
    pub fn is_error(&self) -> bool {
        self.0.contains_key(ERROR_KEY)
    }

    /// The error reason, if this is an error observation.
    pub fn error_message(&self) -> Option<&str> {
        self.0.get(ERROR_KEY).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact JSON, as injected into the transcript.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".into())
    }
}

impl From<Arguments> for Observation {
    fn from(map: Arguments) -> Self {
        Self(map)
    }
}
