pub mod api;
pub mod config;
pub mod errors;
pub mod llm_providers;
pub mod llm_service;
pub mod logging;
pub mod models;
pub mod prompts;
pub mod quiz;
pub mod weakness;

pub use config::Config;
pub use errors::*;
pub use llm_providers::{CompletionProvider, JsonResponseParser, OllamaProvider};
pub use llm_service::LLMService;
pub use models::*;
