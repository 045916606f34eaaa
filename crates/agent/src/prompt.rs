//! The system instruction that seeds every transcript.

use synapse_core::tool::ToolRegistry;

const HEADER: &str = "You are Synapse, an agentic last-mile coordinator.
Follow this exact format when responding. Use JSON for tool args.

THOUGHT: <short reasoning>
ACTION: tool_name(<json_args>)
OBSERVATION: <tool output (will be injected by system)>
POLICY: <policy json with fields {confidence, escalate, advice, suggested_action?, suggested_args?}>
... repeat until solved ...
FINAL_PLAN: <human readable plan>

Rules:
- Use POLICY as a safety signal. If POLICY.escalate is true, you must either:
  (a) call a different tool to gather more info, or
  (b) choose a conservative, low-risk step (e.g., notify stakeholders, defer risky actions), or
  (c) if uncertainty remains, end with FINAL_PLAN that includes 'NEED HUMAN REVIEW'.
- If POLICY suggests a concrete next tool (suggested_action), consider using it.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInstruction {
    text: String,
}

impl SystemInstruction {
    /// The standard instruction, listing every tool in `registry`.
    pub fn for_registry(registry: &ToolRegistry) -> Self {
        let mut text = String::from(HEADER);
        text.push_str("\nAvailable tools and signatures:\n");
        for signature in registry.signatures() {
            text.push_str("- ");
            text.push_str(&signature);
            text.push('\n');
        }
        Self { text }
    }

    /// A caller-supplied instruction, used verbatim.
    pub fn custom(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The transcript preamble for `scenario`.
    pub fn preamble(&self, scenario: &str) -> String {
        format!("{}\nScenario: {}\n", self.text, scenario)
    }
}

impl std::fmt::Display for SystemInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
