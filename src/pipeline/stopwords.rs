// Document-frequency job — the corpus-wide stopword candidate report.
//
// Output is `term<TAB>df`, most widespread first. The report can be handed
// straight back to the terms job as its stopword file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::partition::run_partitions;
use super::sink::{write_rows, StagedOutput};
use super::{build_tokenizer, ExecutionMode, TERMS_BY_DF_DIR};
use crate::records::reader::{partition_files, read_entity_contents};
use crate::stats::frequency::{
    select_terms, CorpusStatsBuilder, DfSelection, EntityTermSets, TermDocStats,
};
use crate::text::analyzer::BaseTokenizer;
use crate::text::shingle::ShingledTokenizer;
use crate::text::stopwords::StopwordSet;

pub struct StopwordsJob {
    pub input: PathBuf,
    pub working_dir: PathBuf,
    pub shingle_size: usize,
    pub stopwords: StopwordSet,
    pub max_df: f64,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone)]
pub struct StopwordsSummary {
    pub partitions: usize,
    pub entities: usize,
    pub selection: DfSelection,
    pub terms: Vec<TermDocStats>,
    pub output: PathBuf,
}

fn collect_partition<T: BaseTokenizer>(
    path: &Path,
    tokenizer: &ShingledTokenizer<T>,
) -> Result<EntityTermSets> {
    let rows = read_entity_contents(path)?;
    let mut builder = CorpusStatsBuilder::new(tokenizer);
    for row in &rows {
        builder.add(row);
    }
    Ok(builder.finish())
}

pub async fn run(job: StopwordsJob) -> Result<StopwordsSummary> {
    let files = partition_files(&job.input)?;
    let partitions = files.len();
    let selection = DfSelection::from_max_df(job.max_df);
    info!(partitions, max_df = job.max_df, mode = %job.mode, "Computing document frequencies");

    let tokenizer = Arc::new(build_tokenizer(job.shingle_size, job.stopwords)?);
    let partials = run_partitions("Counting", files, job.mode, move |path| {
        collect_partition(&path, &tokenizer)
    })
    .await?;

    let mut sets = EntityTermSets::default();
    for partial in partials {
        sets.merge(partial);
    }
    let entities = sets.entity_count();
    let terms = select_terms(sets.doc_stats(), selection);

    let staged = StagedOutput::create(&job.working_dir.join(TERMS_BY_DF_DIR))?;
    write_rows(&staged.part_path(0), &terms)?;
    let output = staged.commit()?;

    Ok(StopwordsSummary {
        partitions,
        entities,
        selection,
        terms,
        output,
    })
}
