// Colored terminal summaries for the batch jobs.
//
// Jobs log their progress through tracing; these functions print the
// human-facing end-of-run report to stdout.

use colored::Colorize;

use super::truncate_chars;
use crate::pipeline::parse::ParseSummary;
use crate::pipeline::stopwords::StopwordsSummary;
use crate::pipeline::terms::TermsSummary;
use crate::stats::frequency::DfSelection;

/// How many rows the summaries preview.
const PREVIEW_ROWS: usize = 10;

/// Terms longer than this are cut in previews (shingles can get long).
const PREVIEW_TERM_CHARS: usize = 40;

pub fn display_parse_summary(summary: &ParseSummary) {
    let stats = &summary.stats;
    println!("\n{}", "=== Parse complete ===".bold());
    println!("  Archives:   {}", summary.archives);
    println!("  Messages:   {}", stats.total);
    println!("  Kept:       {}", stats.kept.to_string().green());

    if stats.skipped() > 0 {
        println!(
            "  Skipped:    {} ({} oversized, {} unparseable)",
            stats.skipped().to_string().yellow(),
            stats.outliers,
            stats.failed
        );
    }
    if stats.total > 0 && stats.failed * 10 > stats.total {
        println!(
            "  {} more than 10% of messages failed to parse",
            "!".bright_red()
        );
    }

    println!("  Output:     {}", summary.output.display());
}

pub fn display_df_summary(summary: &StopwordsSummary) {
    println!(
        "\n{}",
        format!("=== Document frequency ({} entities) ===", summary.entities).bold()
    );
    println!("  Partitions: {}", summary.partitions);
    match summary.selection {
        DfSelection::Top(limit) => println!("  Selection:  top {limit} terms"),
        DfSelection::AtMost(max_df) => println!("  Selection:  df <= {max_df}"),
    }
    println!("  Terms:      {}", summary.terms.len());

    if summary.terms.is_empty() {
        println!("  {}", "No terms selected.".dimmed());
    } else {
        println!();
        println!("  {:<42} {:>8}", "Term".dimmed(), "DF".dimmed());
        println!("  {}", "-".repeat(51).dimmed());
        for stat in summary.terms.iter().take(PREVIEW_ROWS) {
            println!(
                "  {:<42} {:>8.4}",
                truncate_chars(&stat.term, PREVIEW_TERM_CHARS),
                stat.document_frequency()
            );
        }
        if summary.terms.len() > PREVIEW_ROWS {
            println!(
                "  {}",
                format!("... and {} more", summary.terms.len() - PREVIEW_ROWS).dimmed()
            );
        }
    }

    println!("\n  Output:     {}", summary.output.display());
}

pub fn display_terms_summary(summary: &TermsSummary) {
    println!(
        "\n{}",
        format!("=== Significant terms ({} entities) ===", summary.entities).bold()
    );
    println!("  Partitions: {}", summary.partitions);
    println!("  Rows:       {}", summary.rows.len());

    if summary.rows.is_empty() {
        println!("  {}", "No terms passed the minimum score.".dimmed());
    } else {
        println!();
        println!(
            "  {:<32} {:<32} {:>8}",
            "Entity".dimmed(),
            "Term".dimmed(),
            "Score".dimmed()
        );
        println!("  {}", "-".repeat(74).dimmed());
        for row in summary.rows.iter().take(PREVIEW_ROWS) {
            println!(
                "  {:<32} {:<32} {:>8.2}",
                truncate_chars(&row.entity, 29),
                truncate_chars(&row.term, 29),
                row.score
            );
        }
        if summary.rows.len() > PREVIEW_ROWS {
            println!(
                "  {}",
                format!("... and {} more", summary.rows.len() - PREVIEW_ROWS).dimmed()
            );
        }
    }

    println!("\n  Output:     {}", summary.output.display());
}
