// Unit tests for term statistics.
//
// Document frequency over entities, the DF selection modes, the LLR scorer,
// and the significant-term selector's cap and ordering.

use termprint::records::EntityContent;
use termprint::stats::cache::{CandidateCache, EntityTermCounts};
use termprint::stats::frequency::{
    select_terms, CorpusStatsBuilder, DfSelection, EntityTermSets, TermDocStats, TOP_TERMS_LIMIT,
};
use termprint::stats::selector::{ScoreOrder, SignificantTermSelector, TermCollector};
use termprint::stats::significance::{log_likelihood_ratio, LogLikelihoodScorer, SignificanceScorer, TermCounts};
use termprint::text::analyzer::WhitespaceTokenizer;
use termprint::text::quotes::QuoteStripper;
use termprint::text::shingle::ShingledTokenizer;
use termprint::text::stopwords::StopwordSet;

fn unigrams() -> ShingledTokenizer<WhitespaceTokenizer> {
    ShingledTokenizer::new(WhitespaceTokenizer, 1, StopwordSet::default()).unwrap()
}

fn stat(term: &str, distinct: u64, total: u64) -> TermDocStats {
    TermDocStats {
        term: term.to_string(),
        distinct_entities: distinct,
        total_entities: total,
    }
}

// ============================================================
// Document frequency
// ============================================================

#[test]
fn df_counts_entities_not_occurrences() {
    let tokenizer = unigrams();
    let mut builder = CorpusStatsBuilder::new(&tokenizer);
    builder.add(&EntityContent::new("a@x", "rust rust rust rust rust"));
    builder.add(&EntityContent::new("b@x", "rust"));
    builder.add(&EntityContent::new("c@x", "python"));

    let stats = builder.finish().doc_stats();
    let rust = stats.iter().find(|s| s.term == "rust").unwrap();
    assert_eq!(rust.distinct_entities, 2);
    assert_eq!(rust.total_entities, 3);
    assert!((rust.document_frequency() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn df_entity_keys_are_normalized() {
    let tokenizer = unigrams();
    let mut builder = CorpusStatsBuilder::new(&tokenizer);
    builder.add(&EntityContent::new(" A@X ", "word"));
    builder.add(&EntityContent::new("a@x", "word"));
    assert_eq!(builder.finish().entity_count(), 1);
}

#[test]
fn df_merge_across_partitions() {
    let mut left = EntityTermSets::default();
    left.add_terms("a@x", vec!["shared".to_string()]);
    let mut right = EntityTermSets::default();
    right.add_terms("a@x", vec!["shared".to_string()]);
    right.add_terms("b@x", vec!["shared".to_string(), "own".to_string()]);
    left.merge(right);

    let stats = left.doc_stats();
    let shared = stats.iter().find(|s| s.term == "shared").unwrap();
    assert_eq!(shared.distinct_entities, 2);
    assert_eq!(shared.total_entities, 2);
}

#[test]
fn df_selection_mode_from_threshold() {
    assert_eq!(DfSelection::from_max_df(1.0), DfSelection::Top(TOP_TERMS_LIMIT));
    assert_eq!(DfSelection::from_max_df(0.2), DfSelection::AtMost(0.2));
}

#[test]
fn df_top_sorted_descending() {
    let selected = select_terms(
        vec![stat("rare", 1, 10), stat("common", 9, 10), stat("mid", 5, 10)],
        DfSelection::Top(2),
    );
    let terms: Vec<&str> = selected.iter().map(|s| s.term.as_str()).collect();
    assert_eq!(terms, vec!["common", "mid"]);
}

#[test]
fn df_bounded_keeps_at_or_below_threshold() {
    let selected = select_terms(
        vec![stat("rare", 1, 10), stat("common", 9, 10), stat("mid", 5, 10)],
        DfSelection::AtMost(0.5),
    );
    let terms: Vec<&str> = selected.iter().map(|s| s.term.as_str()).collect();
    assert_eq!(terms, vec!["mid", "rare"]);
}

#[test]
fn df_report_line_format() {
    assert_eq!(stat("hello world", 1, 4).to_string(), "hello world\t0.25");
}

// ============================================================
// Significance
// ============================================================

#[test]
fn llr_symmetric_in_table_transpose() {
    let a = log_likelihood_ratio(10, 5, 3, 100);
    let b = log_likelihood_ratio(10, 3, 5, 100);
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn llr_scorer_rewards_distinctive_terms() {
    let distinctive = LogLikelihoodScorer.score(&TermCounts {
        in_entity: 30,
        entity_total: 200,
        in_corpus: 35,
        corpus_total: 5000,
    });
    let ordinary = LogLikelihoodScorer.score(&TermCounts {
        in_entity: 2,
        entity_total: 200,
        in_corpus: 50,
        corpus_total: 5000,
    });
    assert!(distinctive > ordinary);
}

// ============================================================
// Significant term selection
// ============================================================

#[test]
fn selector_caps_at_max_terms() {
    // One entity with 25 terms that nobody else uses, plus a background
    // entity so every candidate is over-represented.
    let mut counts = EntityTermCounts::default();
    for i in 0..25u64 {
        counts.add("focus@x", &format!("topic{i:02}"), 5 + i);
    }
    for i in 0..200u64 {
        counts.add("crowd@x", &format!("chatter{i:03}"), 10);
    }

    let selector = SignificantTermSelector {
        order: ScoreOrder::Descending,
        ..SignificantTermSelector::default()
    };
    let focus: Vec<_> = selector
        .select(&counts)
        .into_iter()
        .filter(|r| r.entity == "focus@x")
        .collect();

    assert_eq!(focus.len(), 20);
    // The five lowest-count terms are the ones cut.
    assert!(focus.iter().all(|r| r.term.as_str() >= "topic05"));
    assert_eq!(focus[0].term, "topic24");
}

#[test]
fn collector_spill_keeps_totals() {
    let tokenizer = unigrams();
    let mut small = TermCollector::new(&tokenizer, QuoteStripper::default(), 2);
    let mut large = TermCollector::new(&tokenizer, QuoteStripper::default(), 10_000);
    for row in [
        EntityContent::new("a@x", "alpha beta gamma alpha"),
        EntityContent::new("b@x", "delta alpha"),
        EntityContent::new("a@x", "beta beta"),
    ] {
        small.add(&row);
        large.add(&row);
    }

    let small = small.finish();
    let large = large.finish();
    for (entity, term) in [("a@x", "alpha"), ("a@x", "beta"), ("b@x", "alpha"), ("b@x", "delta")] {
        assert_eq!(small.get(entity, term), large.get(entity, term));
    }
    assert_eq!(large.get("a@x", "beta"), 3);
}

#[test]
fn cache_spills_when_full() {
    let mut sink = EntityTermCounts::default();
    let mut cache = CandidateCache::new(1);
    cache.increment("a@x", "one", &mut sink);
    cache.increment("a@x", "two", &mut sink);
    assert_eq!(cache.spills(), 1);
    assert_eq!(sink.get("a@x", "one"), 1);
    assert_eq!(sink.get("a@x", "two"), 0);
}
