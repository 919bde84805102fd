use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use termprint::config::{self, Config, DEFAULT_CONCURRENCY};
use termprint::output::terminal;
use termprint::pipeline::{self, ExecutionMode, ModeName};
use termprint::stats::cache::DEFAULT_CACHE_SIZE;
use termprint::stats::selector::{ScoreOrder, SignificantTermSelector, DEFAULT_MIN_SCORE};
use termprint::stats::significance::LogLikelihoodScorer;
use termprint::text::analyzer::EnglishAnalyzer;
use termprint::text::quotes::QuoteStripper;

/// Termprint: per-participant term profiles from mailing-list archives.
///
/// Parses mbox archives into flat records, reports which terms nearly
/// everyone uses, and finds the terms each participant uses unusually often.
#[derive(Parser)]
#[command(name = "termprint", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every job.
#[derive(Args)]
struct RunArgs {
    /// Working directory for job outputs (default: TERMPRINT_WORKING_DIR or ./termprint-work)
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Partition scheduling: local or parallel (default: TERMPRINT_MODE or local)
    #[arg(long)]
    mode: Option<ModeName>,

    /// Partitions processed at once in parallel mode (default: 4)
    #[arg(long)]
    concurrency: Option<usize>,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.working_dir {
            config.working_dir = dir.clone();
        }

        let concurrency = self.concurrency.unwrap_or(match config.mode {
            ExecutionMode::Parallel(n) => n,
            ExecutionMode::Local => DEFAULT_CONCURRENCY,
        });
        config.mode = match (self.mode, config.mode) {
            (Some(ModeName::Local), _) => ExecutionMode::Local,
            (Some(ModeName::Parallel), _) | (None, ExecutionMode::Parallel(_)) => {
                ExecutionMode::Parallel(concurrency)
            }
            (None, ExecutionMode::Local) => ExecutionMode::Local,
        };
    }
}

/// Tokenizer options shared by the stats jobs.
#[derive(Args)]
struct TextArgs {
    /// Words per shingle (default: TERMPRINT_SHINGLE_SIZE or 1)
    #[arg(long)]
    shingle_size: Option<usize>,

    /// Stopword file, one term per line; a document-frequency report works too
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Also drop the built-in English stopword list
    #[arg(long)]
    english_stopwords: bool,
}

impl TextArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(size) = self.shingle_size {
            config.shingle_size = size;
        }
        if let Some(path) = &self.stopwords {
            config.stopwords_path = Some(path.clone());
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse mbox archives into flat records
    Parse {
        /// Archive files to parse
        archives: Vec<PathBuf>,

        /// File listing archive paths, one per line
        #[arg(long)]
        file_list: Option<PathBuf>,

        /// Output directory (default: <working-dir>/emails)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Report document frequency per term (stopword candidates)
    Stopwords {
        /// Flat-record file or directory (default: <working-dir>/emails)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Keep terms at or below this document frequency; 1.0 reports the top 2000
        #[arg(long)]
        max_df: Option<f64>,

        #[command(flatten)]
        text: TextArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Select each participant's most significant terms
    Terms {
        /// Flat-record file or directory (default: <working-dir>/emails)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Terms kept per participant (default: TERMPRINT_MAX_TERMS or 20)
        #[arg(long)]
        max_terms: Option<usize>,

        /// Reject terms scoring below this
        #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,

        /// Also drop quoted lines ("> ...") before counting
        #[arg(long)]
        strip_quoted: bool,

        /// Entries held in the pre-aggregation cache before spilling
        #[arg(long, default_value_t = DEFAULT_CACHE_SIZE)]
        cache_size: usize,

        /// Score direction within each participant: asc or desc
        #[arg(long, default_value = "asc")]
        score_order: ScoreOrder,

        #[command(flatten)]
        text: TextArgs,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("termprint=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Parse {
            archives,
            file_list,
            output_dir,
            run,
        } => {
            run.apply(&mut config);

            let mut archives = archives;
            if let Some(list) = &file_list {
                config::require_path(list, "File list")?;
                archives.extend(pipeline::parse::read_file_list(list)?);
            }
            if archives.is_empty() {
                anyhow::bail!("No archives given. Pass archive paths or --file-list.");
            }

            let job = pipeline::parse::ParseJob {
                archives,
                output_dir: output_dir.unwrap_or_else(|| config.emails_dir()),
                mode: config.mode,
            };
            let summary = pipeline::parse::run(&job).await?;
            terminal::display_parse_summary(&summary);
        }

        Commands::Stopwords {
            input,
            max_df,
            text,
            run,
        } => {
            run.apply(&mut config);
            text.apply(&mut config);
            if let Some(max_df) = max_df {
                config.max_df = max_df;
            }
            config.validate()?;

            let input = input.unwrap_or_else(|| config.emails_dir());
            config::require_path(&input, "Input")?;
            let stopwords = config.load_stopwords(text.english_stopwords, &EnglishAnalyzer::new())?;
            info!(stopwords = stopwords.len(), "Loaded stopwords");

            let job = pipeline::stopwords::StopwordsJob {
                input,
                working_dir: config.working_dir.clone(),
                shingle_size: config.shingle_size,
                stopwords,
                max_df: config.max_df,
                mode: config.mode,
            };
            let summary = pipeline::stopwords::run(job).await?;
            terminal::display_df_summary(&summary);
        }

        Commands::Terms {
            input,
            max_terms,
            min_score,
            strip_quoted,
            cache_size,
            score_order,
            text,
            run,
        } => {
            run.apply(&mut config);
            text.apply(&mut config);
            if let Some(max_terms) = max_terms {
                config.max_terms = max_terms;
            }
            config.validate()?;
            if cache_size == 0 {
                anyhow::bail!("Cache size must be at least 1 (got 0)");
            }

            let input = input.unwrap_or_else(|| config.emails_dir());
            config::require_path(&input, "Input")?;
            let stopwords = config.load_stopwords(text.english_stopwords, &EnglishAnalyzer::new())?;
            info!(stopwords = stopwords.len(), "Loaded stopwords");

            let job = pipeline::terms::TermsJob {
                input,
                working_dir: config.working_dir.clone(),
                shingle_size: config.shingle_size,
                stopwords,
                selector: SignificantTermSelector {
                    scorer: LogLikelihoodScorer,
                    min_score,
                    max_terms_per_entity: config.max_terms,
                    order: score_order,
                },
                stripper: QuoteStripper {
                    strip_quoted_lines: strip_quoted,
                },
                cache_size,
                mode: config.mode,
            };
            let summary = pipeline::terms::run(job).await?;
            terminal::display_terms_summary(&summary);

            if summary.rows.is_empty() {
                println!(
                    "{}",
                    "Tip: lower --min-score or use a smaller stopword list.".dimmed()
                );
            }
        }
    }

    Ok(())
}
