//! The run transcript — an append-only log that doubles as the next prompt.
//!
//! Rendering is incremental: every append extends the rendered text, so the
//! output of [`Transcript::render`] after an append always starts with the
//! output from before it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use synapse_core::action::Arguments;
use synapse_core::observation::Observation;
use synapse_core::policy::PolicyJudgment;

pub const OBSERVATION_MARKER: &str = "OBSERVATION:";
pub const POLICY_MARKER: &str = "POLICY:";
pub const FINAL_PLAN_MARKER: &str = "FINAL_PLAN:";

/// The result of dispatching one directive and judging it.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub tool: String,
    pub args: Arguments,
    pub observation: Observation,
    pub judgment: PolicyJudgment,
}

/// One generation step: the raw block plus its outcomes in directive order.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// 1-based step number
    pub step: usize,
    pub block: String,
    pub outcomes: Vec<Outcome>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    preamble: String,
    entries: Vec<TranscriptEntry>,
    #[serde(skip)]
    rendered: String,
}

impl Transcript {
    pub fn new(preamble: impl Into<String>) -> Self {
        let preamble = preamble.into();
        Self {
            rendered: preamble.clone(),
            preamble,
            entries: Vec::new(),
        }
    }

    /// Append a generated block and the outcomes of its directives.
    pub fn append(&mut self, block: impl Into<String>, outcomes: Vec<Outcome>) -> &TranscriptEntry {
        let block = block.into();

        self.rendered.push('\n');
        self.rendered.push_str(&block);
        self.rendered.push('\n');
        for outcome in &outcomes {
            self.rendered.push_str(OBSERVATION_MARKER);
            self.rendered.push(' ');
            self.rendered.push_str(&outcome.observation.to_json());
            self.rendered.push('\n');
            self.rendered.push_str(POLICY_MARKER);
            self.rendered.push(' ');
            self.rendered.push_str(&outcome.judgment.to_json());
            self.rendered.push('\n');
        }

        let step = self.entries.len() + 1;
        self.entries.push(TranscriptEntry {
            step,
            block,
            outcomes,
            timestamp: Utc::now(),
        });
        &self.entries[step - 1]
    }

    /// The full accumulated context, exactly as sent to the backend next.
    pub fn render(&self) -> &str {
        &self.rendered
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of generation blocks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text after the last final-plan marker in any generated block, trimmed.
    ///
    /// Observation and policy lines are not searched, so a tool that echoes
    /// the marker back cannot end a run.
    pub fn final_plan(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| {
            entry
                .block
                .rfind(FINAL_PLAN_MARKER)
                .map(|at| entry.block[at + FINAL_PLAN_MARKER.len()..].trim())
        })
    }
}
