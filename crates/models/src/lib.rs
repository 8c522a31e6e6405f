//! Chat model capability used by the benchmark run loop

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod error;
mod openai;
mod provider;
mod scripted;

use std::sync::Arc;
use vulnrag_core::error::Result;
use vulnrag_core::ModelConfig;

pub use error::ModelError;
pub use openai::OpenAiChatModel;
pub use provider::ChatModel;
pub use scripted::ScriptedChatModel;

/// Create the configured chat model
pub fn create_chat_model(config: &ModelConfig) -> Result<Arc<dyn ChatModel>> {
    let model = OpenAiChatModel::new(config)?;
    Ok(Arc::new(model))
}
