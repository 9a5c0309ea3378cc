use crate::{
    config::Config,
    credentials::Credentials,
    engine::Engine,
    error::ProcessError,
    grounding, ingest,
    processor::ContractProcessor,
    report::{AnalysisReport, InputInfo},
};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Ingestion followed by extraction, for a single document.
pub struct Pipeline<E: Engine> {
    cfg: Config,
    processor: ContractProcessor<E>,
}

pub struct JobOutput {
    pub input: InputInfo,
    pub text: String,
    /// Extraction outcome. Ingestion failures never get this far.
    pub result: Result<AnalysisReport, ProcessError>,
}

impl<E: Engine> Pipeline<E> {
    pub fn new(cfg: &Config, credentials: Credentials, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            processor: ContractProcessor::new(&cfg.extraction, credentials, engine),
        }
    }

    /// Text ingestion only.
    pub fn ingest(&self, input: &Path) -> Result<(InputInfo, String)> {
        self.ingest_as(input, &input.display().to_string())
    }

    /// Like `ingest`, but records `source` as the input path in the report.
    pub fn ingest_as(&self, input: &Path, source: &str) -> Result<(InputInfo, String)> {
        // Missing files are reported by ingest as NotFound, so only stat existing ones.
        let file_bytes = if input.exists() {
            std::fs::metadata(input)
                .with_context(|| format!("stat input: {}", input.display()))?
                .len()
        } else {
            0
        };
        if file_bytes > self.cfg.ingestion.max_input_file_bytes {
            anyhow::bail!("input exceeds max_input_file_bytes: {}", file_bytes);
        }

        let pages = ingest::extract_pages(input)?;
        let text = ingest::join_pages(&pages);
        let info = InputInfo {
            path: source.to_string(),
            file_bytes,
            page_count: u32::try_from(pages.len()).unwrap_or(u32::MAX),
            text_chars: text.chars().count(),
        };
        info!(
            "ingest pages={} bytes={} chars={}",
            info.page_count, info.file_bytes, info.text_chars
        );
        if info.text_chars == 0 {
            warn!("no text layer found; scanned PDFs are not supported");
        }
        Ok((info, text))
    }

    pub fn run_job(&self, input: &Path, credential: Option<&str>) -> Result<JobOutput> {
        self.run_job_as(input, &input.display().to_string(), credential)
    }

    /// Run a job on `input`, reporting it as `source` (e.g. `-` for a staged upload).
    pub fn run_job_as(
        &self,
        input: &Path,
        source: &str,
        credential: Option<&str>,
    ) -> Result<JobOutput> {
        let started = Instant::now();
        let (info, text) = self.ingest_as(input, source)?;

        let result = self.processor.analyze(&text, credential).map(|analysis| {
            let (analysis, grounding) =
                grounding::apply(self.cfg.grounding.policy, &text, analysis);
            AnalysisReport {
                input: info.clone(),
                model_id: self.processor.model_id().to_string(),
                grounding,
                analysis,
            }
        });

        match &result {
            Ok(report) => info!(
                "analysis complete type={:?} fairness={} clauses={} dates={} elapsed_ms={}",
                report.analysis.contract_type,
                report.analysis.fairness_score,
                report.analysis.high_risk_clauses.len(),
                report.analysis.key_dates.len(),
                started.elapsed().as_millis()
            ),
            Err(err) => warn!("analysis failed: {err}"),
        }

        Ok(JobOutput {
            input: info,
            text,
            result,
        })
    }
}
