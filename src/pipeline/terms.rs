// Significant-terms job — each participant's term profile.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::partition::run_partitions;
use super::sink::{write_rows, StagedOutput};
use super::{build_tokenizer, ExecutionMode, TERMS_DIR};
use crate::records::reader::{partition_files, read_entity_contents};
use crate::stats::cache::EntityTermCounts;
use crate::stats::selector::{EntityTermScore, SignificantTermSelector, TermCollector};
use crate::text::analyzer::BaseTokenizer;
use crate::text::quotes::QuoteStripper;
use crate::text::shingle::ShingledTokenizer;
use crate::text::stopwords::StopwordSet;

pub struct TermsJob {
    pub input: PathBuf,
    pub working_dir: PathBuf,
    pub shingle_size: usize,
    pub stopwords: StopwordSet,
    pub selector: SignificantTermSelector,
    pub stripper: QuoteStripper,
    pub cache_size: usize,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone)]
pub struct TermsSummary {
    pub partitions: usize,
    pub entities: usize,
    pub rows: Vec<EntityTermScore>,
    pub output: PathBuf,
}

fn count_partition<T: BaseTokenizer>(
    path: &Path,
    tokenizer: &ShingledTokenizer<T>,
    stripper: QuoteStripper,
    cache_size: usize,
) -> Result<EntityTermCounts> {
    let rows = read_entity_contents(path)?;
    let mut collector = TermCollector::new(tokenizer, stripper, cache_size);
    for row in &rows {
        collector.add(row);
    }
    Ok(collector.finish())
}

pub async fn run(job: TermsJob) -> Result<TermsSummary> {
    let files = partition_files(&job.input)?;
    let partitions = files.len();
    info!(
        partitions,
        max_terms = job.selector.max_terms_per_entity,
        min_score = job.selector.min_score,
        mode = %job.mode,
        "Selecting significant terms"
    );

    let tokenizer = Arc::new(build_tokenizer(job.shingle_size, job.stopwords)?);
    let stripper = job.stripper;
    let cache_size = job.cache_size;
    let partials = run_partitions("Counting", files, job.mode, move |path| {
        count_partition(&path, &tokenizer, stripper, cache_size)
    })
    .await?;

    let mut counts = EntityTermCounts::default();
    for partial in partials {
        counts.merge(partial);
    }
    let rows = job.selector.select(&counts);

    let staged = StagedOutput::create(&job.working_dir.join(TERMS_DIR))?;
    write_rows(&staged.part_path(0), &rows)?;
    let output = staged.commit()?;

    Ok(TermsSummary {
        partitions,
        entities: counts.entity_count(),
        rows,
        output,
    })
}
