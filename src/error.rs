use std::fmt;
use std::path::PathBuf;

/// Hard failures from text ingestion. Any of these aborts the request.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("PDF file not found at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unreadable PDF {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}

/// Failures raised by a structured-extraction engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
    #[error("output does not match schema: {0}")]
    SchemaViolation(#[from] serde_json::Error),
    #[error("{0}")]
    Fault(String),
}

impl EngineError {
    /// Short category name, used when the failure is collapsed into a message.
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::Transport(_) => "Transport",
            EngineError::Api { .. } => "Api",
            EngineError::MalformedOutput(_) => "MalformedOutput",
            EngineError::SchemaViolation(_) => "SchemaViolation",
            EngineError::Fault(_) => "Fault",
        }
    }
}

/// Any engine failure, reduced to its category name and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub category: String,
    pub details: String,
}

impl ExtractionFailure {
    pub fn message(&self) -> String {
        format!(
            "extraction error type: {} | details: {}",
            self.category, self.details
        )
    }
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<EngineError> for ExtractionFailure {
    fn from(err: EngineError) -> Self {
        Self {
            category: err.category().to_string(),
            details: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("missing API key: pass one explicitly or set it in the environment (or .env)")]
    MissingCredential,
    #[error("{0}")]
    Extraction(ExtractionFailure),
}
