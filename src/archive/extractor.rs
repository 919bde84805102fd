// Message extraction — parse one mbox record into a flat record.
//
// Each extractor instance belongs to exactly one processing unit (one archive
// file). Its outlier accumulator is never shared, so the "abnormally long"
// decision is relative to the messages this unit has already seen.

use chrono::{DateTime, SecondsFormat};
use tracing::{debug, info, warn};

use super::address::Sender;
use super::body::BodyTextCollector;
use super::escape::escape_content;
use super::parser::{self, MessageParser, ParsedEmail};
use super::segmenter::MessageRecord;
use crate::records::FlatRecord;

/// Messages seen before the length filter starts applying.
pub const OUTLIER_WARMUP: u64 = 100;

/// A message longer than this multiple of the running mean is dropped.
pub const OUTLIER_FACTOR: f64 = 4.0;

/// Running length statistics for one processing unit.
///
/// Drops oversized messages (typically someone pasting an entire source tree
/// into a mail) once enough messages have been seen to trust the mean.
#[derive(Debug, Clone, Default)]
pub struct OutlierFilter {
    processed: u64,
    total_chars: u64,
}

impl OutlierFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a message that never produced content (parse failure).
    pub fn count_unparsed(&mut self) {
        self.processed += 1;
    }

    /// Record a message of `len` characters and decide whether to keep it.
    ///
    /// The cutoff uses the character total from before this message, divided
    /// by the message count including this one.
    pub fn admit(&mut self, len: usize) -> bool {
        self.processed += 1;
        let prior_chars = self.total_chars;
        self.total_chars += len as u64;

        if self.processed <= OUTLIER_WARMUP {
            return true;
        }

        let mean = prior_chars as f64 / self.processed as f64;
        len as f64 <= OUTLIER_FACTOR * mean
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }
}

/// Counts reported at the end of an extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Records handed to the extractor
    pub total: u64,
    /// Records written out
    pub kept: u64,
    /// Records dropped by the length filter
    pub outliers: u64,
    /// Records the parser rejected
    pub failed: u64,
}

impl ExtractionStats {
    /// Every dropped record, whatever the reason.
    pub fn skipped(&self) -> u64 {
        self.outliers + self.failed
    }

    pub fn merge(&mut self, other: &ExtractionStats) {
        self.total += other.total;
        self.kept += other.kept;
        self.outliers += other.outliers;
        self.failed += other.failed;
    }
}

/// Turns message records into flat records, one processing unit at a time.
pub struct MessageExtractor<P> {
    parser: P,
    filter: OutlierFilter,
    stats: ExtractionStats,
}

impl<P: MessageParser> MessageExtractor<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            filter: OutlierFilter::new(),
            stats: ExtractionStats::default(),
        }
    }

    /// Extract one record. Returns None when the record is dropped.
    pub fn extract(&mut self, record: &MessageRecord) -> Option<FlatRecord> {
        self.stats.total += 1;

        let parsed = match self.parser.parse(record.text.as_bytes()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Failed to parse message, skipping");
                self.filter.count_unparsed();
                self.stats.failed += 1;
                return None;
            }
        };

        let content = BodyTextCollector::collect(&parsed.events);
        if !self.filter.admit(content.chars().count()) {
            debug!(
                chars = content.chars().count(),
                processed = self.filter.processed(),
                "Dropping oversized message"
            );
            self.stats.outliers += 1;
            return None;
        }

        self.stats.kept += 1;
        Some(build_record(&parsed, &content))
    }

    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    /// End the pass and report the drop counts.
    pub fn finish(self) -> ExtractionStats {
        info!(
            skipped = self.stats.skipped(),
            total = self.stats.total,
            failed = self.stats.failed,
            "Skipped {} emails out of {}",
            self.stats.skipped(),
            self.stats.total
        );
        self.stats
    }
}

fn build_record(parsed: &ParsedEmail, content: &str) -> FlatRecord {
    let header = |name: &str| {
        parsed
            .headers
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let sender = Sender::from_creator(&header(parser::FROM));

    FlatRecord {
        id: header(parser::MESSAGE_ID),
        author: sender.author,
        address: sender.address,
        subject: header(parser::SUBJECT),
        date: normalize_date(&header(parser::DATE)),
        reply_id: header(parser::IN_REPLY_TO),
        content: escape_content(content),
    }
}

/// Render an RFC 2822 date as RFC 3339 UTC; unparseable dates pass through.
pub fn normalize_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    mailparse::dateparse(raw)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| raw.to_string())
}
