// Parse job — mbox archives in, flat records out.
//
// Every archive file is its own partition with its own extractor, so the
// outlier filter's running totals are per file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::partition::run_partitions;
use super::sink::StagedOutput;
use super::ExecutionMode;
use crate::archive::extractor::{ExtractionStats, MessageExtractor};
use crate::archive::parser::MailparseParser;
use crate::archive::segmenter::open_archive;

pub struct ParseJob {
    pub archives: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone)]
pub struct ParseSummary {
    pub archives: usize,
    pub stats: ExtractionStats,
    pub output: PathBuf,
}

/// Read an archive list: one path per line, blank lines and `#` comments
/// ignored. Relative paths resolve against the list's own directory.
pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file list {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let entry = PathBuf::from(line);
            if entry.is_absolute() {
                entry
            } else {
                base.join(entry)
            }
        })
        .collect())
}

/// Segment and extract one archive into one flat-record file.
pub fn parse_archive(archive: &Path, output: &Path) -> Result<ExtractionStats> {
    debug!(archive = %archive.display(), "Parsing archive");
    let segmenter = open_archive(archive)?;
    let mut extractor = MessageExtractor::new(MailparseParser);

    let file =
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut out = BufWriter::new(file);
    for record in segmenter {
        if let Some(flat) = extractor.extract(&record) {
            writeln!(out, "{flat}").with_context(|| format!("Failed to write {}", output.display()))?;
        }
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(extractor.finish())
}

pub async fn run(job: &ParseJob) -> Result<ParseSummary> {
    if job.archives.is_empty() {
        anyhow::bail!("No archives to parse");
    }
    for archive in &job.archives {
        if !archive.is_file() {
            anyhow::bail!("Archive not found: {}", archive.display());
        }
    }

    info!(archives = job.archives.len(), mode = %job.mode, "Parsing archives");

    let staged = StagedOutput::create(&job.output_dir)?;
    let partitions: Vec<(PathBuf, PathBuf)> = job
        .archives
        .iter()
        .enumerate()
        .map(|(i, archive)| (archive.clone(), staged.part_path(i)))
        .collect();

    let per_archive = run_partitions("Parsing", partitions, job.mode, |(archive, output)| {
        parse_archive(&archive, &output)
            .with_context(|| format!("Failed to parse archive {}", archive.display()))
    })
    .await?;

    let mut stats = ExtractionStats::default();
    for s in &per_archive {
        stats.merge(s);
    }

    let output = staged.commit()?;
    info!(
        kept = stats.kept,
        skipped = stats.skipped(),
        total = stats.total,
        "Parse complete"
    );

    Ok(ParseSummary {
        archives: job.archives.len(),
        stats,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_list_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("archives.txt");
        std::fs::write(&list, "# archives\n\na.mbox\n  /abs/b.mbox  \n").unwrap();

        let paths = read_file_list(&list).unwrap();
        assert_eq!(paths, vec![dir.path().join("a.mbox"), PathBuf::from("/abs/b.mbox")]);
    }
}
