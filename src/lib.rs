//! Symptom Advisor: conversational symptom triage
//!
//! # Overview
//!
//! Symptom Advisor turns a free-text description of how someone feels into a short,
//! careful reply. It recognizes symptoms by fuzzy-matching the message against the
//! vocabulary of a one-hot case dataset, ranks diseases by how well their historical
//! cases cover those symptoms, and hands the ranking to an LLM chain whose outputs
//! are validated against JSON Schemas before anything reaches the user.
//!
//! Key features:
//! - CSV dataset loading with configurable disease label columns
//! - Fuzzy symptom extraction that copes with Thai and English text
//! - Deterministic disease ranking by average symptom coverage
//! - Guarded, typed LLM outputs (`Validated`, `SchemaInvalid`, `UpstreamError`)
//! - An OpenAI-compatible chat client (Typhoon by default)
//! - Explicit conversation sessions and a skin-image assessment hook
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use symptom_advisor::{AdvisorConfig, ConversationSession, OpenAICompatibleClient, SymptomAdvisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AdvisorConfig::from_env()?;
//!     let client = Arc::new(OpenAICompatibleClient::from_env()?.build());
//!     let advisor = SymptomAdvisor::from_config(&config, client)?;
//!
//!     let mut session = ConversationSession::new();
//!     let reply = advisor.reply(&mut session, "ปวดหัว และ มีไข้").await;
//!     println!("{}", reply.text);
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod chain;
pub mod config;
pub mod conversation;
mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod model;
pub mod schema;
pub mod symptoms;
pub mod vision;

// Re-exports for convenience
pub use error::{AdvisorError, Result};
pub use schema::{Schema, SchemaBuilder, SchemaType};
pub use model::{Consistency, ConsistencyCheck, HealthAnswer, Instructor, SummaryReport};

pub use backend::{CompletionParams, LLMClient};
#[cfg(feature = "openai")]
pub use backend::OpenAICompatibleClient;

pub use chain::{ChainConfig, Guard, GuardOutcome, TriageChain, TriageReport};
pub use config::{AdvisorConfig, ReplyMode};
pub use conversation::{AdvisorReply, ConversationSession, ReplyKind, SymptomAdvisor};
pub use vision::{SkinClassification, SkinClassifier, SkinImage, SkinLabel};
