// Archive ingestion — mbox segmentation and per-message field extraction.
//
// Raw archive files go in, flat tab-separated records come out. Parsing the
// RFC 822 structure is delegated to a MessageParser implementation; this
// module owns the segmentation, field derivation, outlier filtering and
// escaping that turn parser output into storable records.

pub mod address;
pub mod body;
pub mod escape;
pub mod extractor;
pub mod parser;
pub mod segmenter;
