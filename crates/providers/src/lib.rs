//! Generation backend implementations for Synapse.
//!
//! All providers implement the `synapse_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod openai_compat;
pub mod replay;
pub mod retry;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use replay::ReplayProvider;
pub use retry::RetryingProvider;
pub use router::ProviderRouter;
