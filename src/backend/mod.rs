pub mod client;
#[cfg(feature = "openai")]
pub mod openai;
pub mod utils;

pub use client::{CompletionParams, LLMClient};
#[cfg(feature = "openai")]
pub use openai::OpenAICompatibleClient;
