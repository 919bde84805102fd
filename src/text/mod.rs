// Text features — tokenization, shingling, stopwords and quote stripping.

pub mod analyzer;
pub mod quotes;
pub mod shingle;
pub mod stopwords;
