use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::pipeline::{ExecutionMode, EMAILS_DIR};
use crate::stats::frequency::NO_MAX_DF;
use crate::stats::selector::DEFAULT_MAX_TERMS;
use crate::text::analyzer::BaseTokenizer;
use crate::text::stopwords::StopwordSet;

pub const DEFAULT_WORKING_DIR: &str = "./termprint-work";
pub const DEFAULT_SHINGLE_SIZE: usize = 1;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// value here is a default that command-line flags can override.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root for job outputs (TERMPRINT_WORKING_DIR)
    pub working_dir: PathBuf,
    /// Words per shingle (TERMPRINT_SHINGLE_SIZE)
    pub shingle_size: usize,
    /// Terms kept per entity (TERMPRINT_MAX_TERMS)
    pub max_terms: usize,
    /// Document-frequency ceiling; 1.0 means "report the top terms" (TERMPRINT_MAX_DF)
    pub max_df: f64,
    /// Optional stopword file (TERMPRINT_STOPWORDS)
    pub stopwords_path: Option<PathBuf>,
    /// Partition scheduling (TERMPRINT_MODE + TERMPRINT_CONCURRENCY)
    pub mode: ExecutionMode,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn load() -> Result<Self> {
        let concurrency = env_parse("TERMPRINT_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        let mode = match env::var("TERMPRINT_MODE") {
            Ok(name) => ExecutionMode::from_name(&name, concurrency)
                .context("Invalid TERMPRINT_MODE")?,
            Err(_) => ExecutionMode::Local,
        };

        Ok(Self {
            working_dir: env::var("TERMPRINT_WORKING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORKING_DIR)),
            shingle_size: env_parse("TERMPRINT_SHINGLE_SIZE", DEFAULT_SHINGLE_SIZE)?,
            max_terms: env_parse("TERMPRINT_MAX_TERMS", DEFAULT_MAX_TERMS)?,
            max_df: env_parse("TERMPRINT_MAX_DF", NO_MAX_DF)?,
            stopwords_path: env::var("TERMPRINT_STOPWORDS").ok().map(PathBuf::from),
            mode,
        })
    }

    /// Where the parse job writes flat records by default.
    pub fn emails_dir(&self) -> PathBuf {
        self.working_dir.join(EMAILS_DIR)
    }

    /// Check the tokenizer and selection settings.
    /// Call this after command-line overrides have been applied.
    pub fn validate(&self) -> Result<()> {
        if self.shingle_size == 0 {
            anyhow::bail!("Shingle size must be at least 1 (got 0)");
        }
        if self.max_terms == 0 {
            anyhow::bail!("Max terms per entity must be at least 1 (got 0)");
        }
        if !(0.0..=1.0).contains(&self.max_df) {
            anyhow::bail!("Max document frequency must be between 0 and 1 (got {})", self.max_df);
        }
        if let Some(path) = &self.stopwords_path {
            require_path(path, "Stopwords file")?;
        }
        Ok(())
    }

    /// Build the stopword set: the configured file, plus the built-in
    /// English list when `english` is set.
    pub fn load_stopwords<T: BaseTokenizer>(&self, english: bool, tokenizer: &T) -> Result<StopwordSet> {
        let mut words = match &self.stopwords_path {
            Some(path) => StopwordSet::from_file(path)?,
            None => StopwordSet::default(),
        };
        if english {
            words.extend(StopwordSet::english(tokenizer));
        }
        Ok(words)
    }
}

/// Fail with a configuration error if `path` does not exist.
pub fn require_path(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{what} not found: {}", path.display());
    }
    Ok(())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}
