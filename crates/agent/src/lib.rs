//! The orchestration loop — the heart of Synapse.
//!
//! A run follows a **Generate → Parse → Dispatch → Judge → Append** cycle:
//!
//! 1. **Seed** the transcript with the system instruction and the scenario
//! 2. **Generate** the next block from the full transcript
//! 3. **Parse** every `ACTION: tool({...})` directive out of the block
//! 4. **Dispatch** each directive to its tool, in order
//! 5. **Judge** each outcome through the policy adapter
//! 6. **Append** the block, observations and judgments to the transcript
//!
//! The loop ends when a block contains `FINAL_PLAN:` or the step limit is
//! reached. Tool failures and policy failures are folded into the
//! transcript; only a generation failure ends a run early.

pub mod parser;
pub mod prompt;
pub mod runner;
pub mod transcript;

#[cfg(test)]
mod test_helpers;

pub use parser::{ACTION_MARKER, Actions, collect_actions, parse_actions};
pub use prompt::SystemInstruction;
pub use runner::{RunError, RunOptions, RunResult, ScenarioRunner, StopReason};
pub use transcript::{FINAL_PLAN_MARKER, Outcome, Transcript, TranscriptEntry};
