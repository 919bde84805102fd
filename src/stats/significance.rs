// Significance scorer trait — how unusual is a term for one entity?
//
// A scorer compares the term's frequency within one entity's content against
// the rest of the corpus. The default is Dunning's log-likelihood ratio,
// which behaves well for the small counts typical of per-person term lists.

/// The 2x2 contingency counts for one (entity, term) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCounts {
    /// Occurrences of the term in this entity's content
    pub in_entity: u64,
    /// All term occurrences in this entity's content
    pub entity_total: u64,
    /// Occurrences of the term across the whole corpus
    pub in_corpus: u64,
    /// All term occurrences across the whole corpus
    pub corpus_total: u64,
}

/// Trait for scoring a term's significance for one entity.
pub trait SignificanceScorer: Send + Sync {
    fn score(&self, counts: &TermCounts) -> f64;
}

/// Log-likelihood ratio (G²) scorer.
///
/// Terms the entity uses no more often than everyone else score 0, so only
/// over-represented terms can pass a positive minimum score.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLikelihoodScorer;

impl SignificanceScorer for LogLikelihoodScorer {
    fn score(&self, counts: &TermCounts) -> f64 {
        let k11 = counts.in_entity;
        let k12 = counts.entity_total.saturating_sub(k11);
        let k21 = counts.in_corpus.saturating_sub(k11);
        let k22 = counts
            .corpus_total
            .saturating_sub(counts.entity_total)
            .saturating_sub(k21);

        let entity_rate = rate(k11, k11 + k12);
        let other_rate = rate(k21, k21 + k22);
        if entity_rate <= other_rate {
            return 0.0;
        }

        log_likelihood_ratio(k11, k12, k21, k22)
    }
}

fn rate(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn x_log_x(x: u64) -> f64 {
    if x == 0 {
        0.0
    } else {
        let x = x as f64;
        x * x.ln()
    }
}

/// Unnormalized Shannon entropy of a set of counts.
fn entropy(counts: &[u64]) -> f64 {
    let sum: u64 = counts.iter().sum();
    x_log_x(sum) - counts.iter().map(|&c| x_log_x(c)).sum::<f64>()
}

/// G² statistic for a 2x2 contingency table.
pub fn log_likelihood_ratio(k11: u64, k12: u64, k21: u64, k22: u64) -> f64 {
    let row_entropy = entropy(&[k11 + k12, k21 + k22]);
    let column_entropy = entropy(&[k11 + k21, k12 + k22]);
    let matrix_entropy = entropy(&[k11, k12, k21, k22]);

    // Rounding can push this a hair below zero for independent tables.
    if row_entropy + column_entropy < matrix_entropy {
        return 0.0;
    }
    2.0 * (row_entropy + column_entropy - matrix_entropy)
}
