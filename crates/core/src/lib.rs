//! # Synapse Core
//!
//! Domain types, traits, and error definitions for the Synapse orchestration
//! runtime. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator of the orchestration loop is a trait here:
//! - [`Provider`] — the text-generation backend
//! - [`Tool`] — a named, side-effecting action with declared keyword parameters
//! - [`PolicyEvaluator`] — the opaque confidence/risk judge
//!
//! Implementations live in their respective crates, which keeps test doubles
//! trivial and the dependency graph pointing inward.

pub mod action;
pub mod error;
pub mod observation;
pub mod policy;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use action::{ActionDirective, Arguments};
pub use error::{PolicyError, ProviderError, ToolError};
pub use observation::Observation;
pub use policy::{PolicyEvaluator, PolicyJudgment, PolicyRequest};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{Tool, ToolDefinition, ToolRegistry};
