//! LLM-backed semantic validation.
//!
//! [`OllamaValidator`] asks a local model to assess the document and
//! return a structured JSON verdict. The request pins `temperature` to
//! `0.0` and asks for `format: "json"` so the response is as
//! deterministic and parseable as the model allows; anything that does
//! not deserialize into [`LlmAssessment`] with every field present is
//! rejected as malformed rather than patched up. The engine treats the
//! LLM verdict as one evidence source among several, so a conservative
//! parse here keeps garbage out of the fused result.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use clauseguard_core::engine::LlmValidator;
use clauseguard_core::error::UpstreamError;
use clauseguard_core::models::LlmAssessment;

use crate::config::LlmConfig;

const VALIDATION_PROMPT: &str = r#"You are a financial document validator reviewing a term sheet.

Analyze the document below and identify validation problems: missing or inconsistent financial terms, ambiguous obligations, malformed dates or amounts, and clauses that contradict each other.

Respond with ONLY a JSON object in exactly this shape:
{
  "errors": [
    {"type": "<short error code>", "description": "<specific issue found>", "section": "<document section>", "severity": "LOW|MEDIUM|HIGH|CRITICAL"}
  ],
  "criticality_score": <integer 0-100>,
  "validation_summary": "<one or two sentence assessment>"
}

If the document has no problems, return an empty errors array, a low criticality_score, and a summary saying the document is sound.

Document:
{text}
"#;

/// Validator backed by a local Ollama generate endpoint.
pub struct OllamaValidator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaValidator {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[async_trait]
impl LlmValidator for OllamaValidator {
    async fn validate(&self, text: &str) -> Result<LlmAssessment, UpstreamError> {
        let prompt = VALIDATION_PROMPT.replace("{text}", text);
        let url = format!("{}/api/generate", self.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "format": "json",
                "stream": false,
                "options": {"temperature": 0.0, "num_ctx": 16000},
            }))
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("LLM request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "LLM service returned HTTP {}",
                response.status()
            )));
        }

        let wrapper: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(format!("LLM response envelope: {e}")))?;

        serde_json::from_str(&wrapper.response)
            .map_err(|e| UpstreamError::Malformed(format!("LLM verdict did not parse: {e}")))
    }
}
