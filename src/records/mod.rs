// Flat record interchange format.
//
// One message per line, seven tab-separated fields:
//   id, author, address, subject, date, replyId, content
// Content is escaped (see archive::escape) so it never contains a raw tab or
// line terminator. Downstream stages only need the entity and the content.

pub mod reader;

use std::fmt;

use thiserror::Error;

use crate::archive::address::entity_key;
use crate::archive::escape::unescape_content;

/// Number of fields in a flat record line.
pub const FIELD_COUNT: usize = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid input line (expected {FIELD_COUNT} fields, found {found}): {line}")]
    FieldCount { found: usize, line: String },
}

/// One parsed message in storable form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    pub id: String,
    pub author: String,
    pub address: String,
    pub subject: String,
    pub date: String,
    pub reply_id: String,
    /// Escaped body text
    pub content: String,
}

impl FlatRecord {
    /// Parse a line produced by `Display`. A wrong field count is fatal for
    /// the consuming stage.
    pub fn parse_line(line: &str) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != FIELD_COUNT {
            return Err(RecordError::FieldCount {
                found: fields.len(),
                line: line.to_string(),
            });
        }

        Ok(Self {
            id: fields[0].to_string(),
            author: fields[1].to_string(),
            address: fields[2].to_string(),
            subject: fields[3].to_string(),
            date: fields[4].to_string(),
            reply_id: fields[5].to_string(),
            content: fields[6].to_string(),
        })
    }

    /// The entity key and unescaped content — all the stats stages need.
    pub fn into_entity_content(self) -> EntityContent {
        EntityContent {
            entity: entity_key(&self.address),
            content: unescape_content(&self.content),
        }
    }
}

impl fmt::Display for FlatRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values can carry stray tabs; they'd break the field count.
        let clean = |s: &str| s.replace(['\t', '\r', '\n'], " ");
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            clean(&self.id),
            clean(&self.author),
            clean(&self.address),
            clean(&self.subject),
            clean(&self.date),
            clean(&self.reply_id),
            self.content
        )
    }
}

/// A normalized entity (email address) with one message's plain content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityContent {
    pub entity: String,
    pub content: String,
}

impl EntityContent {
    pub fn new(entity: &str, content: &str) -> Self {
        Self {
            entity: entity_key(entity),
            content: content.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatRecord {
        FlatRecord {
            id: "<1@x>".to_string(),
            author: "Jane Doe ".to_string(),
            address: "Jane@X.com".to_string(),
            subject: "Hi".to_string(),
            date: "2013-06-25T17:31:00Z".to_string(),
            reply_id: String::new(),
            content: "a\\nb\\tc".to_string(),
        }
    }

    #[test]
    fn test_line_has_seven_fields() {
        let line = sample().to_string();
        assert_eq!(line.split('\t').count(), FIELD_COUNT);
        assert_eq!(FlatRecord::parse_line(&line).unwrap(), sample());
    }

    #[test]
    fn test_wrong_field_count_is_error() {
        let err = FlatRecord::parse_line("a\tb\tc").unwrap_err();
        assert!(matches!(err, RecordError::FieldCount { found: 3, .. }));
    }

    #[test]
    fn test_entity_content_normalizes() {
        let ec = sample().into_entity_content();
        assert_eq!(ec.entity, "jane@x.com");
        assert_eq!(ec.content, "a\nb\tc");
    }

    #[test]
    fn test_header_tabs_are_flattened() {
        let mut record = sample();
        record.subject = "Re:\tthing".to_string();
        let line = record.to_string();
        assert_eq!(line.split('\t').count(), FIELD_COUNT);
    }
}
