use crate::{
    config::Config,
    credentials::Credentials,
    engine::GeminiEngine,
    error::IngestError,
    pipeline::Pipeline,
    report::{AnalysisReport, render_markdown},
    schema::ContractAnalysis,
    upload::StagedUpload,
    util::{ensure_dir, hash_file, looks_like_url, now_rfc3339, sha256_hex},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "contract-guardian")]
#[command(about = "Flag risky clauses in PDF contracts using LLM structured extraction")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./contract-guardian.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show effective settings and whether an API key resolves.
    Doctor {},
    /// Print the response schema sent to the extraction engine.
    Schema {},
    /// Extract the PDF text layer only.
    Extract {
        #[arg(long)]
        input: PathBuf,
        /// Write the text here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Extract text and run the risk analysis. Use `--input -` to read the PDF from stdin.
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Markdown,
    Json,
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    // Environment fallbacks are captured once, before any command runs.
    let credentials = Credentials::from_env(&cfg.credentials);

    match &args.cmd {
        Command::Doctor {} => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            credentials.log_startup();
            doctor(&cfg, &credentials)
        }
        Command::Schema {} => {
            println!(
                "{}",
                serde_json::to_string_pretty(&ContractAnalysis::response_schema())?
            );
            Ok(())
        }
        Command::Extract { input, out } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            extract(&cfg, input, out.as_deref())
        }
        Command::Analyze {
            input,
            api_key,
            out_dir,
            format,
        } => analyze(
            &args,
            &cfg,
            credentials,
            input,
            api_key.as_deref(),
            out_dir.as_deref(),
            *format,
        ),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    ["contract-guardian.toml", "contract-guardian.example.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the report, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config, credentials: &Credentials) -> Result<()> {
    let diag = serde_json::json!({
        "model_id": cfg.extraction.model_id,
        "fence_output": cfg.extraction.fence_output,
        "endpoint": cfg.extraction.endpoint,
        "grounding_policy": cfg.grounding.policy,
        "credential_env_vars": cfg.credentials.env_vars,
        "credential_found": credentials.resolve(None).is_some(),
        "credential_source": credentials.source(),
        "dotenv": credentials.dotenv().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn extract(cfg: &Config, input: &Path, out: Option<&Path>) -> Result<()> {
    validate_input(cfg, input)?;
    let text = crate::ingest::extract(input)?;
    info!("extracted {} characters from {}", text.chars().count(), input.display());
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_dir(parent)?;
            }
            std::fs::write(path, &text)
                .with_context(|| format!("write text: {}", path.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn analyze(
    args: &Args,
    cfg: &Config,
    credentials: Credentials,
    input: &Path,
    api_key: Option<&str>,
    out_override: Option<&Path>,
    format: Format,
) -> Result<()> {
    // `-` stages stdin into work_dir; the staged file is removed when this returns.
    let staged = if input == Path::new("-") {
        let staged = StagedUpload::from_reader(
            Path::new(&cfg.paths.work_dir),
            "stdin.pdf",
            std::io::stdin().lock(),
            cfg.ingestion.max_input_file_bytes,
        )?;
        if staged.is_empty() {
            return Err(anyhow!("no PDF bytes on stdin"));
        }
        Some(staged)
    } else {
        validate_input(cfg, input)?;
        // Report NotFound before hashing opens the file.
        if !input.exists() {
            return Err(IngestError::NotFound(input.to_path_buf()).into());
        }
        None
    };
    let source = if staged.is_some() {
        "-".to_string()
    } else {
        input.display().to_string()
    };
    let input = staged.as_ref().map(|s| s.path()).unwrap_or(input);

    let cfg_hash = sha256_hex(cfg.normalized_for_hash().as_bytes());
    let input_hash =
        hash_file(input).with_context(|| format!("hashing input: {}", input.display()))?;
    let job_id = sha256_hex(format!("{}:{}", cfg_hash, input_hash).as_bytes());

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let job_dir = out_root.join(&job_id);

    if job_dir.exists() && !cfg.global.resume {
        return Err(anyhow!(
            "job_dir already exists and resume=false: {}",
            job_dir.display()
        ));
    }
    ensure_dir(&job_dir)?;
    ensure_dir(&job_dir.join("logs"))?;

    let log_path = resolve_log_path(cfg, Some(&job_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;
    credentials.log_startup();

    info!("job_id={job_id} out={}", job_dir.display());

    if cfg.debug.dump_effective_config {
        let raw = toml::to_string(cfg).unwrap_or_default();
        std::fs::write(job_dir.join("effective-config.toml"), raw)?;
    }

    let engine = GeminiEngine::new(&cfg.extraction)?;
    let pipeline = Pipeline::new(cfg, credentials, engine);

    let started = now_rfc3339();
    let job = match pipeline.run_job_as(input, &source, api_key) {
        Ok(job) => job,
        Err(err) => {
            write_index(cfg, &job_dir, &job_id, &started, "error", Some(&format!("{err:#}")))?;
            return Err(err);
        }
    };

    if cfg.debug.dump_extracted_text {
        std::fs::write(job_dir.join(&cfg.output.text_filename), &job.text)?;
    }

    let report = match job.result {
        Ok(report) => report,
        Err(err) => {
            write_index(cfg, &job_dir, &job_id, &started, "error", Some(&err.to_string()))?;
            return Err(anyhow::Error::new(err).context("analysis failed"));
        }
    };

    write_outputs(cfg, &job_dir, &report)?;
    write_index(cfg, &job_dir, &job_id, &started, "ok", None)?;

    match format {
        Format::Markdown => println!("{}", render_markdown(&report)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.grounding.all_grounded() {
        warn!("some clauses cite text that is not in the contract; see the evidence check");
    }

    if cfg.global.print_summary {
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "job_id": job_id,
                "job_dir": job_dir,
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn write_outputs(cfg: &Config, job_dir: &Path, report: &AnalysisReport) -> Result<()> {
    if cfg.output.write_json {
        std::fs::write(
            job_dir.join(&cfg.output.json_filename),
            serde_json::to_string_pretty(report)?,
        )?;
    }
    if cfg.output.write_markdown {
        std::fs::write(
            job_dir.join(&cfg.output.markdown_filename),
            render_markdown(report),
        )?;
    }
    Ok(())
}

fn write_index(
    cfg: &Config,
    job_dir: &Path,
    job_id: &str,
    started: &str,
    status: &str,
    error: Option<&str>,
) -> Result<()> {
    if !cfg.output.write_index_json {
        return Ok(());
    }
    let index = serde_json::json!({
        "job_id": job_id,
        "started": started,
        "finished": now_rfc3339(),
        "status": status,
        "error": error,
        "analysis": cfg.output.json_filename,
        "report": cfg.output.markdown_filename,
    });
    std::fs::write(job_dir.join("index.json"), serde_json::to_string_pretty(&index)?)?;
    Ok(())
}

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.ingestion.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    match input.extension().and_then(|s| s.to_str()) {
        Some(ext) if !ext.eq_ignore_ascii_case("pdf") && cfg.ingestion.require_pdf_extension => {
            return Err(anyhow!("input is not a PDF: {}", input.display()));
        }
        Some(_) => {}
        None => warn!("input has no extension; assuming PDF: {}", input.display()),
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, job_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(job_dir) = job_dir {
        return Some(job_dir.join("logs").join("contract-guardian.log"));
    }

    Some(PathBuf::from(&cfg.paths.out_dir).join("contract-guardian.log"))
}
