//! AI adapters.
//!
//! - `OpenAIAssistantDirectory` - Lists assistants through the OpenAI Assistants API

mod openai_assistant_directory;

pub use openai_assistant_directory::{OpenAIAssistantDirectory, OpenAIConfig};
