use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything one extraction call needs.
#[derive(Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub text: &'a str,
    pub task_description: &'a str,
    pub schema: &'a Value,
    pub api_key: &'a str,
    pub model_id: &'a str,
    pub fence_output: bool,
    pub temperature: f32,
}

impl std::fmt::Debug for ExtractionRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionRequest")
            .field("text_chars", &self.text.chars().count())
            .field("model_id", &self.model_id)
            .field("fence_output", &self.fence_output)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

/// Subset of the generateContent response we read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetadata {
    #[serde(default, rename = "promptTokenCount")]
    pub prompt_token_count: u64,
    #[serde(default, rename = "candidatesTokenCount")]
    pub candidates_token_count: u64,
}
