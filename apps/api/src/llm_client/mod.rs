/// LLM Client - the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation API directly.
/// All LLM interactions MUST go through this module.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all generation calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-pro";
const MAX_RETRIES: u32 = 3;

/// Typed failure of the generation capability. The pipeline never assumes
/// a generation call succeeds; callers decide whether a failure is recovered
/// locally (synthesizer, resume analysis) or surfaced (answer scoring).
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    #[error("Generation quota exceeded after {retries} retries")]
    QuotaExceeded { retries: u32 },

    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Extracts the text of the first candidate part.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

/// The single generation client used by all pipeline stages.
/// Wraps the Gemini generateContent API with retry logic and a structured
/// JSON output helper.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes a raw generateContent call, returning the response text.
    /// Retries on 429 (quota) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str) -> Result<String, GenError> {
        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let mut last_error: Option<GenError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Generation call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GenError::Unavailable(e.to_string()));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 {
                let body = response.text().await.unwrap_or_default();
                warn!("Generation API returned 429: {body}");
                last_error = Some(GenError::QuotaExceeded {
                    retries: attempt + 1,
                });
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generation API returned {status}: {body}");
                last_error = Some(GenError::Unavailable(format!("status {status}: {body}")));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GenError::Unavailable(format!("status {status}: {body}")));
            }

            let parsed: GenerateResponse = response
                .json()
                .await
                .map_err(|e| GenError::InvalidResponse(e.to_string()))?;

            let text = parsed
                .text()
                .ok_or_else(|| GenError::InvalidResponse("empty response content".to_string()))?;

            debug!("Generation call succeeded ({} chars)", text.len());

            return Ok(text.to_string());
        }

        Err(last_error.unwrap_or(GenError::QuotaExceeded {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience method that calls the model and deserializes the text
    /// response as JSON. The prompt must instruct the model to return valid
    /// JSON matching `T`.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, GenError> {
        let text = self.call(prompt).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(text).map_err(|e| GenError::InvalidResponse(e.to_string()))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_response_text_extracts_first_part() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"overall_score\": 80.0}"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), Some("{\"overall_score\": 80.0}"));
    }

    #[test]
    fn test_response_text_none_when_no_candidates() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.text(), None);
    }
}
