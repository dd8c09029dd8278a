//! Conversation routing around the symptom pipeline.

mod advisor;
pub mod intents;
mod session;

pub use advisor::{AdvisorReply, ReplyKind, SymptomAdvisor};
pub use session::{ChatRole, ChatTurn, ConversationSession};
