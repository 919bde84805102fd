// Document frequency — the share of participants that use a term at all.
//
// A "document" here is an entity: every message from one address counts as
// one document. A term used fifty times by one person and once by another
// has a distinct-entity count of two.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::info;

use crate::records::EntityContent;
use crate::text::analyzer::BaseTokenizer;
use crate::text::shingle::ShingledTokenizer;

/// Threshold value meaning "no maximum document frequency".
pub const NO_MAX_DF: f64 = 1.0;

/// How many terms the unbounded report keeps.
pub const TOP_TERMS_LIMIT: usize = 2000;

/// Per-term document statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TermDocStats {
    pub term: String,
    pub distinct_entities: u64,
    pub total_entities: u64,
}

impl TermDocStats {
    /// Fraction of entities whose content contains the term, in [0, 1].
    pub fn document_frequency(&self) -> f64 {
        if self.total_entities == 0 {
            0.0
        } else {
            self.distinct_entities as f64 / self.total_entities as f64
        }
    }
}

impl fmt::Display for TermDocStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.term, self.document_frequency())
    }
}

/// Which terms end up in the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DfSelection {
    /// The N most widespread terms
    Top(usize),
    /// Every term at or below this document frequency
    AtMost(f64),
}

impl DfSelection {
    /// Map the configured max-df threshold onto a selection mode.
    pub fn from_max_df(max_df: f64) -> Self {
        if max_df >= NO_MAX_DF {
            DfSelection::Top(TOP_TERMS_LIMIT)
        } else {
            DfSelection::AtMost(max_df)
        }
    }
}

/// Partial aggregate: the set of distinct terms each entity used.
#[derive(Debug, Clone, Default)]
pub struct EntityTermSets {
    terms_by_entity: HashMap<String, HashSet<String>>,
}

impl EntityTermSets {
    /// Record that `entity` used each of `terms`. An entity with no terms
    /// still counts toward the corpus total.
    pub fn add_terms<I>(&mut self, entity: &str, terms: I)
    where
        I: IntoIterator<Item = String>,
    {
        let set = self.terms_by_entity.entry(entity.to_string()).or_default();
        set.extend(terms);
    }

    pub fn merge(&mut self, other: EntityTermSets) {
        for (entity, terms) in other.terms_by_entity {
            self.terms_by_entity.entry(entity).or_default().extend(terms);
        }
    }

    pub fn entity_count(&self) -> usize {
        self.terms_by_entity.len()
    }

    /// Count distinct entities per term and join with the corpus total.
    pub fn doc_stats(&self) -> Vec<TermDocStats> {
        let total_entities = self.terms_by_entity.len() as u64;

        let mut counts: HashMap<&str, u64> = HashMap::new();
        for terms in self.terms_by_entity.values() {
            for term in terms {
                *counts.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .map(|(term, distinct_entities)| TermDocStats {
                term: term.to_string(),
                distinct_entities,
                total_entities,
            })
            .collect()
    }
}

/// Builds the per-entity term sets for one partition.
pub struct CorpusStatsBuilder<'a, T> {
    tokenizer: &'a ShingledTokenizer<T>,
    sets: EntityTermSets,
}

impl<'a, T: BaseTokenizer> CorpusStatsBuilder<'a, T> {
    pub fn new(tokenizer: &'a ShingledTokenizer<T>) -> Self {
        Self {
            tokenizer,
            sets: EntityTermSets::default(),
        }
    }

    pub fn add(&mut self, row: &EntityContent) {
        let terms = self.tokenizer.terms(&row.content);
        self.sets.add_terms(&row.entity, terms);
    }

    pub fn finish(self) -> EntityTermSets {
        self.sets
    }
}

/// Sort by document frequency (descending, ties by term) and apply the
/// selection mode.
pub fn select_terms(mut stats: Vec<TermDocStats>, selection: DfSelection) -> Vec<TermDocStats> {
    stats.sort_by(|a, b| {
        b.document_frequency()
            .partial_cmp(&a.document_frequency())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });

    let selected: Vec<TermDocStats> = match selection {
        DfSelection::Top(limit) => stats.into_iter().take(limit).collect(),
        DfSelection::AtMost(max_df) => stats
            .into_iter()
            .filter(|s| s.document_frequency() <= max_df)
            .collect(),
    };

    info!(
        terms = selected.len(),
        mode = ?selection,
        "Selected terms by document frequency"
    );
    selected
}
