use crate::config;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// What happened when `.env` loading was attempted at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DotenvStatus {
    #[default]
    Disabled,
    NotFound,
    Loaded(PathBuf),
    Unreadable(String),
}

impl fmt::Display for DotenvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DotenvStatus::Disabled => f.write_str("disabled"),
            DotenvStatus::NotFound => f.write_str("not found"),
            DotenvStatus::Loaded(path) => write!(f, "loaded {}", path.display()),
            DotenvStatus::Unreadable(err) => write!(f, "unreadable: {err}"),
        }
    }
}

/// API key captured from the environment at startup.
///
/// The configured variables are read exactly once, in order, and the first
/// non-empty value is kept. `resolve` then layers an explicit key on top.
#[derive(Clone, Default)]
pub struct Credentials {
    fallback: Option<(String, String)>,
    dotenv: DotenvStatus,
}

impl Credentials {
    /// Runs before logging is up, so the `.env` outcome is kept for `log_startup`.
    pub fn from_env(cfg: &config::Credentials) -> Self {
        let dotenv = if cfg.load_dotenv {
            match dotenvy::dotenv() {
                Ok(path) => DotenvStatus::Loaded(path),
                Err(err) if err.not_found() => DotenvStatus::NotFound,
                Err(err) => DotenvStatus::Unreadable(err.to_string()),
            }
        } else {
            DotenvStatus::Disabled
        };
        Self {
            dotenv,
            ..Self::from_lookup(&cfg.env_vars, |name| std::env::var(name).ok())
        }
    }

    pub fn from_lookup<F>(names: &[String], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback = names.iter().find_map(|name| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (name.clone(), v))
        });
        Self {
            fallback,
            dotenv: DotenvStatus::Disabled,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Explicit key first, then the captured environment value.
    pub fn resolve<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or_else(|| self.fallback.as_ref().map(|(_, v)| v.as_str()))
    }

    /// Name of the variable the fallback key came from.
    pub fn source(&self) -> Option<&str> {
        self.fallback.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn dotenv(&self) -> &DotenvStatus {
        &self.dotenv
    }

    /// Emit what `from_env` saw, once a subscriber is installed.
    pub fn log_startup(&self) {
        debug!(
            "credentials dotenv={} source={}",
            self.dotenv,
            self.source().unwrap_or("none")
        );
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("source", &self.source())
            .field("dotenv", &self.dotenv)
            .finish()
    }
}
