use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TASK_DESCRIPTION: &str = "Extract high-risk clauses, key dates, and fairness assessments from the provided legal contract. \
Pay special attention to automatic renewals, limitation of liability, termination rights, and confidentiality terms. \
Ensure all extracted original_text matches the source document exactly.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub extraction: Extraction,
    #[serde(default)]
    pub ingestion: Ingestion,
    #[serde(default)]
    pub grounding: Grounding,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub print_summary: bool,
    pub resume: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
            resume: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub out_dir: String,
    pub work_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            work_dir: ".contract-guardian-work".into(),
        }
    }
}

/// Where the API key may come from when none is passed explicitly.
/// Variables are tried in order; the first non-empty one wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub env_vars: Vec<String>,
    pub load_dotenv: bool,
}
impl Default for Credentials {
    fn default() -> Self {
        Self {
            env_vars: vec!["LANGEXTRACT_API_KEY".into(), "GOOGLE_API_KEY".into()],
            load_dotenv: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub model_id: String,
    pub fence_output: bool,
    pub task_description: String,
    pub endpoint: String,
    pub temperature: f32,
    /// 0 disables the request timeout.
    pub timeout_seconds: u64,
}
impl Default for Extraction {
    fn default() -> Self {
        Self {
            model_id: "gemini-1.5-flash".into(),
            fence_output: true,
            task_description: DEFAULT_TASK_DESCRIPTION.into(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            temperature: 0.0,
            timeout_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingestion {
    pub max_input_file_bytes: u64,
    pub reject_url_inputs: bool,
    pub require_pdf_extension: bool,
}
impl Default for Ingestion {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 200 * 1024 * 1024,
            reject_url_inputs: true,
            require_pdf_extension: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroundingPolicy {
    Off,
    Warn,
    Drop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grounding {
    pub policy: GroundingPolicy,
}
impl Default for Grounding {
    fn default() -> Self {
        Self {
            policy: GroundingPolicy::Warn,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub write_json: bool,
    pub write_markdown: bool,
    pub write_index_json: bool,
    pub json_filename: String,
    pub markdown_filename: String,
    pub text_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_json: true,
            write_markdown: true,
            write_index_json: true,
            json_filename: "analysis.json".into(),
            markdown_filename: "report.md".into(),
            text_filename: "extracted_text.txt".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debug {
    pub dump_extracted_text: bool,
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            dump_extracted_text: false,
            dump_effective_config: true,
        }
    }
}
