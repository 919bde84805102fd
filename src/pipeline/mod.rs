// Batch jobs over partitioned input.
//
// Each job splits its input into partitions (one file each), processes them
// with independent per-partition state, merges the partial results and
// commits its output directory in one step.

pub mod parse;
pub mod partition;
pub mod sink;
pub mod stopwords;
pub mod terms;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::text::analyzer::EnglishAnalyzer;
use crate::text::shingle::ShingledTokenizer;
use crate::text::stopwords::StopwordSet;

/// Working directory subdirectory for parsed flat records.
pub const EMAILS_DIR: &str = "emails";
/// Working directory subdirectory for the document-frequency report.
pub const TERMS_BY_DF_DIR: &str = "terms-by-df";
/// Working directory subdirectory for per-entity significant terms.
pub const TERMS_DIR: &str = "terms";

/// How partitions are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One partition at a time, in input order
    Local,
    /// Up to N partitions at once
    Parallel(usize),
}

impl ExecutionMode {
    pub fn concurrency(&self) -> usize {
        match self {
            ExecutionMode::Local => 1,
            ExecutionMode::Parallel(n) => (*n).max(1),
        }
    }

    /// Build a mode from its name plus the configured worker count.
    pub fn from_name(name: &str, concurrency: usize) -> Result<Self> {
        match name.parse::<ModeName>() {
            Ok(ModeName::Local) => Ok(ExecutionMode::Local),
            Ok(ModeName::Parallel) => Ok(ExecutionMode::Parallel(concurrency)),
            Err(e) => anyhow::bail!(e),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Local => write!(f, "local"),
            ExecutionMode::Parallel(n) => write!(f, "parallel ({n} workers)"),
        }
    }
}

/// The mode names accepted on the command line and in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeName {
    Local,
    Parallel,
}

impl FromStr for ModeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ModeName::Local),
            "parallel" => Ok(ModeName::Parallel),
            other => Err(format!("unknown execution mode '{other}' (expected local or parallel)")),
        }
    }
}

/// The tokenizer every stats job uses: English analysis plus shingling.
pub fn build_tokenizer(
    shingle_size: usize,
    stopwords: StopwordSet,
) -> Result<ShingledTokenizer<EnglishAnalyzer>> {
    ShingledTokenizer::new(EnglishAnalyzer::new(), shingle_size, stopwords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_name() {
        assert_eq!(ExecutionMode::from_name("local", 8).unwrap(), ExecutionMode::Local);
        assert_eq!(
            ExecutionMode::from_name("Parallel", 8).unwrap(),
            ExecutionMode::Parallel(8)
        );
        assert!(ExecutionMode::from_name("cluster", 8).is_err());
    }

    #[test]
    fn test_parallel_never_zero_workers() {
        assert_eq!(ExecutionMode::Parallel(0).concurrency(), 1);
    }
}
