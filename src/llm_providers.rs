use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{error, info};

use crate::errors::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama2";

/// Anything that turns a prompt into a full completion in one call
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one prompt and wait for the whole completion text
    async fn complete(&self, prompt: &str) -> Result<String, ApiError>;

    /// Get the provider name for logging
    fn provider_name(&self) -> &'static str;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

/// Ollama-style `/api/generate` text-completion endpoint
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// `timeout` of `None` leaves the request unbounded
    pub fn new(
        base_url: Option<String>,
        model: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        info!(
            provider = self.provider_name(),
            model = %self.model,
            base_url = %self.base_url,
            prompt_length = prompt.len(),
            "Making LLM request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&request_body)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            error!(
                provider = self.provider_name(),
                status = %status,
                error = %body,
                "LLM API request failed"
            );
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = serde_json::from_str(&body).map_err(|e| ApiError::Protocol {
            message: format!("response body is not JSON: {}", e),
            raw: Some(body.clone()),
        })?;

        let generated: GenerateResponse =
            serde_json::from_value(envelope).map_err(|_| ApiError::Protocol {
                message: "missing 'response' key in LLM output".to_string(),
                raw: Some(body.clone()),
            })?;

        info!(
            provider = self.provider_name(),
            response_length = generated.response.len(),
            "Successfully received LLM response"
        );

        Ok(generated.response)
    }

    fn provider_name(&self) -> &'static str {
        "Ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

static JSON_ARRAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.*?\}\s*\]").expect("array pattern compiles"));

/// Locates and parses JSON inside free-form model output
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponseParser;

impl JsonResponseParser {
    /// First `[ {...} ]` block in the text, or the text unchanged when there is none
    pub fn extract_json_array(content: &str) -> &str {
        JSON_ARRAY_PATTERN
            .find(content)
            .map(|m| m.as_str())
            .unwrap_or(content)
    }

    /// The whole text if it is a JSON object, else the outermost `{...}` span
    /// if that parses, else the text unchanged
    pub fn extract_json_object(content: &str) -> &str {
        if serde_json::from_str::<Value>(content).is_ok() {
            return content;
        }

        if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
            if end > start {
                let candidate = &content[start..=end];
                if serde_json::from_str::<Value>(candidate).is_ok() {
                    return candidate;
                }
            }
        }

        content
    }

    /// Parse `json_text` into a value, then into `T`.
    ///
    /// Invalid JSON is a `Parse` error; valid JSON of the wrong shape is a
    /// `Schema` error. Both carry `raw`, the full model output.
    pub fn parse_as<T>(json_text: &str, raw: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let value: Value = serde_json::from_str(json_text).map_err(|source| ApiError::Parse {
            source,
            raw: raw.to_string(),
        })?;
        Self::from_value(value, raw)
    }

    pub fn from_value<T>(value: Value, raw: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(value).map_err(|source| ApiError::Schema {
            source,
            raw: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedMcq;
    use serde_json::json;

    #[test]
    fn test_extracts_array_surrounded_by_prose() {
        let raw = r#"Sure! Here's the data: [{"title":"X","summary":"Y"}] Hope that helps."#;
        let extracted = JsonResponseParser::extract_json_array(raw);
        assert_eq!(extracted, r#"[{"title":"X","summary":"Y"}]"#);

        let parsed: Value = JsonResponseParser::parse_as(extracted, raw).unwrap();
        assert_eq!(parsed, json!([{"title": "X", "summary": "Y"}]));
    }

    #[test]
    fn test_array_extraction_spans_multiple_objects_with_nested_arrays() {
        let raw = r#"Here you go:
[
  {"question": "Q1", "correct_answer": "A", "wrong_options": ["B", "C", "D"]},
  {"question": "Q2", "correct_answer": "E", "wrong_options": ["F", "G", "H"]}
]
Good luck!"#;
        let extracted = JsonResponseParser::extract_json_array(raw);
        let parsed: Vec<GeneratedMcq> = JsonResponseParser::parse_as(extracted, raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].wrong_options, vec!["F", "G", "H"]);
    }

    #[test]
    fn test_array_extraction_falls_back_to_input_text() {
        let raw = "I cannot help with that.";
        assert_eq!(JsonResponseParser::extract_json_array(raw), raw);
    }

    #[test]
    fn test_object_extraction_prefers_whole_text() {
        let raw = r#"{"overview": "Intro {not a brace issue}"}"#;
        assert_eq!(JsonResponseParser::extract_json_object(raw), raw);
    }

    #[test]
    fn test_object_extraction_trims_prose() {
        let raw = "Here is your JSON:\n{\"questions\": []}\nEnjoy!";
        assert_eq!(
            JsonResponseParser::extract_json_object(raw),
            "{\"questions\": []}"
        );
    }

    #[test]
    fn test_plain_prose_is_parse_error_with_raw_text() {
        let raw = "The sky is blue.";
        let extracted = JsonResponseParser::extract_json_object(raw);
        let result = JsonResponseParser::parse_as::<Value>(extracted, raw);

        match result {
            Err(ApiError::Parse { raw: carried, .. }) => assert_eq!(carried, raw),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        let raw = r#"[{"question": "Q", "correct_answer": "A"}]"#;
        let result = JsonResponseParser::parse_as::<Vec<GeneratedMcq>>(raw, raw);
        assert!(matches!(result, Err(ApiError::Schema { .. })));
    }

    #[test]
    fn test_provider_defaults() {
        let provider = OllamaProvider::new(None, None, None).unwrap();
        assert_eq!(provider.provider_name(), "Ollama");
        assert_eq!(provider.model_name(), "llama2");
        assert_eq!(provider.endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_provider_trims_trailing_slash() {
        let provider = OllamaProvider::new(
            Some("http://gpu-box:11434/".to_string()),
            Some("mistral".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://gpu-box:11434/api/generate");
        assert_eq!(provider.model_name(), "mistral");
    }
}
