// Corpus statistics — document frequency and per-entity significant terms.
//
// Both stages group by entity (normalized email address). Partition-level
// partial aggregates are built independently and merged afterwards, so no
// mutable state is shared between concurrently processed partitions.

pub mod cache;
pub mod frequency;
pub mod selector;
pub mod significance;
