// Significant term selection — the per-entity term profile.
//
// Terms are counted per entity, scored against the corpus background with a
// SignificanceScorer, thresholded, capped per entity, then flattened into
// (entity, term, score) rows.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::info;

use super::cache::{CandidateCache, EntityTermCounts};
use super::significance::{LogLikelihoodScorer, SignificanceScorer, TermCounts};
use crate::records::EntityContent;
use crate::text::analyzer::BaseTokenizer;
use crate::text::quotes::QuoteStripper;
use crate::text::shingle::ShingledTokenizer;

pub const DEFAULT_MAX_TERMS: usize = 20;

/// Candidates scoring below this are rejected.
pub const DEFAULT_MIN_SCORE: f64 = 1.0;

/// Direction of the score component in the final (entity, score) ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoreOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for ScoreOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(ScoreOrder::Ascending),
            "desc" | "descending" => Ok(ScoreOrder::Descending),
            other => Err(format!("unknown score order '{other}' (expected asc or desc)")),
        }
    }
}

/// One output row of a term profile.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTermScore {
    pub entity: String,
    pub term: String,
    pub score: f64,
}

impl fmt::Display for EntityTermScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.entity, self.term, self.score)
    }
}

/// Selected terms for one entity as parallel arrays, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTerms {
    pub entity: String,
    pub terms: Vec<String>,
    pub scores: Vec<f64>,
}

impl EntityTerms {
    pub fn flatten(self) -> impl Iterator<Item = EntityTermScore> {
        let entity = self.entity;
        self.terms
            .into_iter()
            .zip(self.scores)
            .map(move |(term, score)| EntityTermScore {
                entity: entity.clone(),
                term,
                score,
            })
    }
}

/// Counts terms per entity for one partition.
pub struct TermCollector<'a, T> {
    tokenizer: &'a ShingledTokenizer<T>,
    stripper: QuoteStripper,
    cache: CandidateCache,
    counts: EntityTermCounts,
}

impl<'a, T: BaseTokenizer> TermCollector<'a, T> {
    pub fn new(tokenizer: &'a ShingledTokenizer<T>, stripper: QuoteStripper, cache_size: usize) -> Self {
        Self {
            tokenizer,
            stripper,
            cache: CandidateCache::new(cache_size),
            counts: EntityTermCounts::default(),
        }
    }

    pub fn add(&mut self, row: &EntityContent) {
        let content = self.stripper.apply(&row.content);
        self.counts.touch(&row.entity);
        for term in self.tokenizer.terms(&content) {
            self.cache.increment(&row.entity, &term, &mut self.counts);
        }
    }

    pub fn finish(mut self) -> EntityTermCounts {
        self.cache.spill(&mut self.counts);
        self.counts
    }
}

/// Ranks and caps each entity's terms by significance.
pub struct SignificantTermSelector<S = LogLikelihoodScorer> {
    pub scorer: S,
    /// Reject candidates scoring below this
    pub min_score: f64,
    /// Keep at most this many terms per entity
    pub max_terms_per_entity: usize,
    pub order: ScoreOrder,
}

impl Default for SignificantTermSelector<LogLikelihoodScorer> {
    fn default() -> Self {
        Self {
            scorer: LogLikelihoodScorer,
            min_score: DEFAULT_MIN_SCORE,
            max_terms_per_entity: DEFAULT_MAX_TERMS,
            order: ScoreOrder::default(),
        }
    }
}

impl<S: SignificanceScorer> SignificantTermSelector<S> {
    /// Best terms per entity, entities in key order.
    pub fn top_terms(&self, counts: &EntityTermCounts) -> Vec<EntityTerms> {
        let mut background: HashMap<&str, u64> = HashMap::new();
        let mut corpus_total = 0u64;
        for (_, terms) in counts.iter() {
            for (term, &n) in terms {
                *background.entry(term.as_str()).or_insert(0) += n;
                corpus_total += n;
            }
        }

        let mut profiles: Vec<EntityTerms> = counts
            .iter()
            .map(|(entity, terms)| {
                let entity_total: u64 = terms.values().sum();

                let mut candidates: Vec<(&String, f64)> = terms
                    .iter()
                    .map(|(term, &in_entity)| {
                        let score = self.scorer.score(&TermCounts {
                            in_entity,
                            entity_total,
                            in_corpus: background.get(term.as_str()).copied().unwrap_or(0),
                            corpus_total,
                        });
                        (term, score)
                    })
                    .filter(|(_, score)| *score >= self.min_score)
                    .collect();

                candidates.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| a.0.cmp(b.0))
                });
                candidates.truncate(self.max_terms_per_entity);

                let (terms, scores): (Vec<String>, Vec<f64>) = candidates
                    .into_iter()
                    .map(|(term, score)| (term.clone(), score))
                    .unzip();

                EntityTerms {
                    entity: entity.clone(),
                    terms,
                    scores,
                }
            })
            .collect();

        profiles.sort_by(|a, b| a.entity.cmp(&b.entity));
        profiles
    }

    /// Flattened rows ordered by (entity, score).
    pub fn select(&self, counts: &EntityTermCounts) -> Vec<EntityTermScore> {
        let mut rows: Vec<EntityTermScore> = self
            .top_terms(counts)
            .into_iter()
            .flat_map(EntityTerms::flatten)
            .collect();

        rows.sort_by(|a, b| {
            let by_score = a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
            let by_score = match self.order {
                ScoreOrder::Ascending => by_score,
                ScoreOrder::Descending => by_score.reverse(),
            };
            a.entity
                .cmp(&b.entity)
                .then(by_score)
                .then_with(|| a.term.cmp(&b.term))
        });

        info!(
            entities = counts.entity_count(),
            rows = rows.len(),
            "Selected significant terms"
        );
        rows
    }
}
