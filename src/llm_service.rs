use rand::Rng;
use serde::de::Error as _;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::config::LLMConfig;
use crate::errors::ApiError;
use crate::llm_providers::{CompletionProvider, JsonResponseParser, OllamaProvider};
use crate::models::{GeneratedMcq, Mcq, QuizRequest, ReviewRequest, SubtopicQuery, TopicQuery};
use crate::{log_llm_operation, prompts, quiz};

/// Prompt, call, extract and post-process for every generation endpoint
#[derive(Clone)]
pub struct LLMService {
    provider: Arc<dyn CompletionProvider>,
}

impl LLMService {
    pub fn from_config(config: &LLMConfig) -> Result<Self, reqwest::Error> {
        let provider = OllamaProvider::new(
            Some(config.base_url.clone()),
            Some(config.model.clone()),
            config.timeout(),
        )?;
        Ok(Self::with_provider(Arc::new(provider)))
    }

    pub fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Get the provider name for logging and testing
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Get the model name being used
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    async fn complete(&self, operation: &'static str, prompt: &str) -> Result<String, ApiError> {
        log_llm_operation!(
            start,
            operation,
            provider = self.provider_name(),
            model = self.model_name()
        );
        let started = Instant::now();

        match self.provider.complete(prompt).await {
            Ok(text) => {
                log_llm_operation!(
                    success,
                    operation,
                    provider = self.provider_name(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    response_length = text.len()
                );
                debug!(operation, response_content = %text, "Raw LLM response");
                if text.trim().is_empty() {
                    log_llm_operation!(warn, operation, "empty completion");
                }
                Ok(text)
            }
            Err(e) => {
                log_llm_operation!(
                    error,
                    operation,
                    provider = self.provider_name(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = e
                );
                Err(e)
            }
        }
    }

    pub async fn generate_learning_content(&self, query: &TopicQuery) -> Result<Value, ApiError> {
        let prompt = prompts::learning_content_prompt(&query.topic);
        let raw = self.complete("generate_learning_content", &prompt).await?;

        let json_text = JsonResponseParser::extract_json_object(&raw);
        JsonResponseParser::parse_as(json_text, &raw)
    }

    pub async fn generate_quiz(&self, request: &QuizRequest) -> Result<Value, ApiError> {
        let weak_topics = request.weak_topics.as_deref().unwrap_or_default();
        let prompt = prompts::quiz_prompt(&request.topic, weak_topics);
        let raw = self.complete("generate_quiz", &prompt).await?;

        let json_text = JsonResponseParser::extract_json_object(&raw);
        JsonResponseParser::parse_as(json_text, &raw)
    }

    /// The model's own `weak_topics` is replaced by one rebuilt from
    /// `incorrect_details`; every other key is forwarded as produced
    pub async fn review_answers(&self, request: &ReviewRequest) -> Result<Value, ApiError> {
        let prompt = prompts::review_prompt(&request.questions, &request.answers);
        let raw = self.complete("review_answers", &prompt).await?;

        let json_text = JsonResponseParser::extract_json_object(&raw);
        let mut review: Value = JsonResponseParser::parse_as(json_text, &raw)?;
        let Some(object) = review.as_object_mut() else {
            return Err(ApiError::Schema {
                source: serde_json::Error::custom("review result must be a JSON object"),
                raw,
            });
        };

        let details = object
            .get("incorrect_details")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let weak_topics = quiz::weak_topics_from_details(details);

        debug!(
            incorrect_details = details.len(),
            weak_topics = ?weak_topics,
            "Recomputed weak topics from review"
        );
        object.insert("weak_topics".to_string(), Value::from(weak_topics));
        Ok(review)
    }

    pub async fn generate_subtopic_summaries(
        &self,
        query: &TopicQuery,
    ) -> Result<Value, ApiError> {
        let prompt = prompts::subtopic_summaries_prompt(&query.topic);
        let raw = self.complete("generate_subtopic_summaries", &prompt).await?;

        let json_text = JsonResponseParser::extract_json_array(&raw);
        JsonResponseParser::parse_as(json_text, &raw)
    }

    pub async fn generate_mcqs(&self, query: &SubtopicQuery) -> Result<Vec<Mcq>, ApiError> {
        let generated = self.generate_raw_mcqs(query).await?;
        Ok(quiz::shuffle_mcqs(generated, &mut rand::thread_rng()))
    }

    /// Same as [`generate_mcqs`](Self::generate_mcqs) with a caller-supplied randomness source
    pub async fn generate_mcqs_with_rng<R>(&self, query: &SubtopicQuery, rng: &mut R) -> Result<Vec<Mcq>, ApiError>
    where
        R: Rng + Send + ?Sized,
    {
        let generated = self.generate_raw_mcqs(query).await?;
        Ok(quiz::shuffle_mcqs(generated, rng))
    }

    async fn generate_raw_mcqs(&self, query: &SubtopicQuery) -> Result<Vec<GeneratedMcq>, ApiError> {
        let prompt = prompts::mcq_prompt(&query.subtopic);
        let raw = self.complete("generate_mcqs", &prompt).await?;

        let json_text = JsonResponseParser::extract_json_array(&raw);
        JsonResponseParser::parse_as(json_text, &raw)
    }
}
