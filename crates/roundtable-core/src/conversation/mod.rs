//! Conversation engine.
//!
//! - `context`: builds one agent's generation request from the log
//! - `pipeline`: the prefetch slot for the next turn
//! - `state`: mutable session state behind the orchestrator's lock
//! - `orchestrator`: the public control surface and the driver loop

pub mod context;
pub mod orchestrator;
pub mod pipeline;
mod state;

pub use context::{ContextBuilder, length_instruction};
pub use orchestrator::{Collaborators, ConversationOrchestrator, TurnError};
pub use pipeline::{PrefetchSlot, PreparedTurn};
