use crate::{
    config::Extraction,
    credentials::Credentials,
    engine::{Engine, ExtractionRequest},
    error::{ExtractionFailure, ProcessError},
    schema::ContractAnalysis,
};
use serde_json::Value;
use tracing::{error, info};

/// Outcome of one analysis: the engine's instance, or why there is none.
pub type AnalysisResult = Result<ContractAnalysis, ProcessError>;

/// Submits contract text to an extraction engine with a fixed task and schema.
///
/// One attempt per call. The engine's output is returned exactly as produced;
/// any engine failure comes back as `ProcessError::Extraction`.
pub struct ContractProcessor<E: Engine> {
    cfg: Extraction,
    credentials: Credentials,
    schema: Value,
    engine: E,
}

impl<E: Engine> ContractProcessor<E> {
    pub fn new(cfg: &Extraction, credentials: Credentials, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            credentials,
            schema: ContractAnalysis::response_schema(),
            engine,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.cfg.model_id
    }

    pub fn analyze(&self, text: &str, credential: Option<&str>) -> AnalysisResult {
        let api_key = self
            .credentials
            .resolve(credential)
            .ok_or(ProcessError::MissingCredential)?;

        let req = ExtractionRequest {
            text,
            task_description: &self.cfg.task_description,
            schema: &self.schema,
            api_key,
            model_id: &self.cfg.model_id,
            fence_output: self.cfg.fence_output,
            temperature: self.cfg.temperature,
        };

        info!(
            "extract model={} fence_output={} chars={}",
            self.cfg.model_id,
            self.cfg.fence_output,
            text.chars().count()
        );

        self.engine.extract(&req).map_err(|err| {
            let failure = ExtractionFailure::from(err);
            error!("{}", failure);
            ProcessError::Extraction(failure)
        })
    }
}
