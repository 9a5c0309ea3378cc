use super::{
    Engine,
    types::{ExtractionRequest, GenerateResponse},
};
use crate::{config::Extraction, error::EngineError, schema::ContractAnalysis};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Structured extraction against the Gemini `generateContent` REST API.
pub struct GeminiEngine {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GeminiEngine {
    pub fn new(cfg: &Extraction) -> Result<Self, EngineError> {
        let timeout = (cfg.timeout_seconds > 0).then(|| Duration::from_secs(cfg.timeout_seconds));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("contract-guardian/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, model_id: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model_id)
    }

    /// Request body for one extraction. With `fence_output` the schema goes
    /// into the instructions and the model must answer in a ```json fence;
    /// otherwise the API's own JSON mode enforces the schema.
    pub fn build_request_body(req: &ExtractionRequest<'_>) -> Value {
        let mut instructions = req.task_description.to_string();
        let mut generation = json!({ "temperature": req.temperature });

        if req.fence_output {
            let schema = serde_json::to_string_pretty(req.schema).unwrap_or_default();
            instructions.push_str(
                "\n\nRespond with exactly one JSON object matching this schema, \
                 wrapped in a ```json fenced code block and nothing else:\n",
            );
            instructions.push_str(&schema);
        } else {
            generation["responseMimeType"] = json!("application/json");
            generation["responseSchema"] = req.schema.clone();
        }

        json!({
            "system_instruction": { "parts": [{ "text": instructions }] },
            "contents": [{ "role": "user", "parts": [{ "text": req.text }] }],
            "generationConfig": generation,
        })
    }
}

impl Engine for GeminiEngine {
    fn extract(&self, req: &ExtractionRequest<'_>) -> Result<ContractAnalysis, EngineError> {
        let body = Self::build_request_body(req);
        debug!(?req, "gemini request");

        let response = self
            .client
            .post(self.url(req.model_id))
            .header("x-goog-api-key", req.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let resp: GenerateResponse = response.json()?;
        if let Some(usage) = &resp.usage_metadata {
            debug!(
                "gemini usage prompt_tokens={} output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        let text = response_text(&resp)?;
        parse_output(&text, req.fence_output)
    }
}

fn response_text(resp: &GenerateResponse) -> Result<String, EngineError> {
    let candidate = resp
        .candidates
        .first()
        .ok_or_else(|| EngineError::MalformedOutput("response has no candidates".into()))?;

    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(EngineError::MalformedOutput(format!(
            "empty candidate text (finishReason={reason})"
        )));
    }
    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!("gemini finished with finishReason={reason}");
        }
    }
    Ok(text)
}

/// Decode model output into the schema, unwrapping the fence when required.
pub fn parse_output(text: &str, fenced: bool) -> Result<ContractAnalysis, EngineError> {
    let payload = if fenced {
        strip_fence(text).ok_or_else(|| {
            EngineError::MalformedOutput("expected a fenced ```json block in model output".into())
        })?
    } else {
        text.trim()
    };
    Ok(serde_json::from_str(payload)?)
}

/// Contents of the first fenced code block, if any.
fn strip_fence(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}
