pub mod gemini;
pub mod types;

use crate::{error::EngineError, schema::ContractAnalysis};

pub use gemini::GeminiEngine;
pub use types::ExtractionRequest;

/// A structured-extraction backend: text + instructions + schema in,
/// a populated `ContractAnalysis` out.
pub trait Engine {
    fn extract(&self, req: &ExtractionRequest<'_>) -> Result<ContractAnalysis, EngineError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn extract(&self, req: &ExtractionRequest<'_>) -> Result<ContractAnalysis, EngineError> {
        (**self).extract(req)
    }
}
