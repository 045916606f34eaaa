//! Policy evaluation — a confidence and escalation signal for every tool call.
//!
//! After each dispatched directive the orchestration loop asks the
//! [`PolicyAdapter`] for a judgment. The adapter consults an opaque
//! [`PolicyEvaluator`](synapse_core::PolicyEvaluator) and normalizes whatever
//! comes back into a well-formed [`PolicyJudgment`](synapse_core::PolicyJudgment).
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//! │  Agent Loop  │───▶│   Policy     │───▶│  Evaluator  │
//! │ (outcome)    │    │   Adapter    │    │ (heuristic) │
//! └─────────────┘    └──────────────┘    └─────────────┘
//!                          │
//!                    ┌─────┴──────┐
//!                    │  Judgment  │
//!                    │ confidence │
//!                    │ escalate   │
//!                    │ advice     │
//!                    └────────────┘
//! ```
//!
//! Judgments are advisory: they are written into the transcript and never
//! block an action.

mod adapter;
mod heuristic;

pub use adapter::PolicyAdapter;
pub use heuristic::HeuristicEvaluator;
