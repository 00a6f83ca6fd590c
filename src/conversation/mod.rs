//! Conversation Module
//!
//! Keeps a multi-turn conversation coherent without any server-side state.
//!
//! ## Submodules
//! - **`intent`**: ordered rule tables that recognise follow-ups and pick a rewrite template.
//! - **`query`**: rewrites a follow-up into a self-contained query using the prior topic.
//! - **`context`**: last topic, carried keywords and the set of answers already shown.
//! - **`session`**: the per-conversation orchestrator tying the above to `SearchEngine`.

pub mod context;
pub mod intent;
pub mod query;
pub mod session;

pub use context::ConversationContext;
pub use intent::{classify, is_follow_up, FollowUpIntent};
pub use query::build_contextual_query;
pub use session::{Answer, ConversationSession, Role, Turn};
