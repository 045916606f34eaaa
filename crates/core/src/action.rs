//! Action directives — parsed requests to invoke a tool.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Keyword arguments for a tool call.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// One `ACTION: name({...})` occurrence extracted from generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDirective {
    /// Name of the tool to invoke
    pub tool: String,

    /// Parsed argument object (empty if the payload was malformed)
    pub args: Arguments,

    /// Byte range of the whole directive within the source text
    pub span: Range<usize>,

    /// Why the payload was replaced by an empty mapping, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_error: Option<String>,
}

impl ActionDirective {
    pub fn new(tool: impl Into<String>, args: Arguments, span: Range<usize>) -> Self {
        Self {
            tool: tool.into(),
            args,
            span,
            args_error: None,
        }
    }

    /// A directive whose payload could not be parsed.
    pub fn with_malformed_args(
        tool: impl Into<String>,
        span: Range<usize>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            args: Arguments::new(),
            span,
            args_error: Some(reason.into()),
        }
    }

    /// Whether the payload had to be discarded.
    pub fn has_malformed_args(&self) -> bool {
        self.args_error.is_some()
    }
}
