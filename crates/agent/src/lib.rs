//! The query pipeline: the heart of CoinClaw.
//!
//! Every query follows the same path:
//!
//! 1. **Record** the turn in the session's conversation memory
//! 2. **Check intent**: predictions and investment advice are refused
//! 3. **Resolve** the coin from the text (or the previous turn, for follow-ups)
//! 4. **Look up** the fact store, refreshing stale prices through the provider chain
//! 5. **Render** the requested fact, or explain why it is unavailable

pub mod answer;
pub mod conversation;
pub mod orchestrator;
pub mod policy;
pub mod resolver;
pub mod staleness;

#[cfg(test)]
mod test_helpers;

pub use answer::QuestionKind;
pub use conversation::ConversationMemory;
pub use orchestrator::QueryOrchestrator;
pub use policy::IntentPolicy;
pub use resolver::{EntityResolver, ResolutionStage};
pub use staleness::StalenessPolicy;
