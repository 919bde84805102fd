// Message parser trait — swap-ready abstraction over RFC 822 parsing.
//
// The extractor only needs a header map and a stream of body events. The
// default implementation is backed by the `mailparse` crate; HTML parts are
// flattened to text with `html2text` before being split into paragraphs.

use std::collections::HashMap;

use mailparse::{DispositionType, ParsedMail};
use thiserror::Error;

use super::body::{BodyEvent, Element};
use super::segmenter::BOUNDARY_PREFIX;

pub const MESSAGE_ID: &str = "message-id";
pub const FROM: &str = "from";
pub const SUBJECT: &str = "subject";
pub const IN_REPLY_TO: &str = "in-reply-to";
pub const DATE: &str = "date";

/// Column width used when rendering HTML bodies to text.
const HTML_RENDER_WIDTH: usize = 120;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed message: {0}")]
    Malformed(#[from] mailparse::MailParseError),
    #[error("message has no text body part")]
    NoTextBody,
    #[error("failed to render HTML body: {0}")]
    Html(String),
}

/// Decoded header values keyed by lower-cased header name.
///
/// When a header repeats, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    values: HashMap<String, String>,
}

impl HeaderMap {
    pub fn insert(&mut self, name: &str, value: String) {
        self.values.entry(name.to_ascii_lowercase()).or_insert(value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Parser output: headers plus the body as structural events.
#[derive(Debug, Clone, Default)]
pub struct ParsedEmail {
    pub headers: HeaderMap,
    pub events: Vec<BodyEvent>,
}

/// Trait for turning raw message bytes into headers and body events.
pub trait MessageParser: Send + Sync {
    fn parse(&self, raw: &[u8]) -> Result<ParsedEmail, ParseError>;
}

/// Default parser backed by `mailparse`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailparseParser;

impl MessageParser for MailparseParser {
    fn parse(&self, raw: &[u8]) -> Result<ParsedEmail, ParseError> {
        let parsed = mailparse::parse_mail(strip_envelope_line(raw))?;

        let mut headers = HeaderMap::default();
        for header in &parsed.headers {
            headers.insert(&header.get_key(), header.get_value());
        }

        let mut events = Vec::new();
        if !collect_text_parts(&parsed, &mut events)? {
            return Err(ParseError::NoTextBody);
        }

        Ok(ParsedEmail { headers, events })
    }
}

/// Drop the mbox "From " envelope line, which isn't an RFC 822 header.
fn strip_envelope_line(raw: &[u8]) -> &[u8] {
    if !raw.starts_with(BOUNDARY_PREFIX.as_bytes()) {
        return raw;
    }
    match raw.iter().position(|&b| b == b'\n') {
        Some(idx) => &raw[idx + 1..],
        None => &[],
    }
}

/// Walk the MIME tree and emit events for every text part.
/// Returns whether any text part was found.
fn collect_text_parts(part: &ParsedMail, events: &mut Vec<BodyEvent>) -> Result<bool, ParseError> {
    if part.get_content_disposition().disposition == DispositionType::Attachment {
        return Ok(false);
    }

    let mime = part.ctype.mimetype.to_ascii_lowercase();

    if !part.subparts.is_empty() {
        // Alternatives carry the same text twice; take the plainest one.
        if mime == "multipart/alternative" {
            let preferred = part
                .subparts
                .iter()
                .find(|p| p.ctype.mimetype.eq_ignore_ascii_case("text/plain"))
                .or_else(|| part.subparts.first());
            return match preferred {
                Some(p) => collect_text_parts(p, events),
                None => Ok(false),
            };
        }

        let mut found = false;
        for sub in &part.subparts {
            found |= collect_text_parts(sub, events)?;
        }
        return Ok(found);
    }

    match mime.as_str() {
        "text/plain" => {
            let body = part.get_body()?;
            events.extend(plain_text_events(&body));
            Ok(true)
        }
        "text/html" => {
            let html = part.get_body()?;
            let text = html2text::from_read(html.as_bytes(), HTML_RENDER_WIDTH)
                .map_err(|e| ParseError::Html(e.to_string()))?;
            events.extend(plain_text_events(&text));
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Turn plain text into paragraph events.
///
/// Blank lines separate paragraphs; each line inside a paragraph is one text
/// run, with a line break between consecutive lines.
pub fn plain_text_events(text: &str) -> Vec<BodyEvent> {
    let mut events = Vec::new();
    let mut in_paragraph = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            if in_paragraph {
                events.push(BodyEvent::End(Element::Paragraph));
                in_paragraph = false;
            }
            continue;
        }

        if in_paragraph {
            events.push(BodyEvent::Start(Element::LineBreak));
            events.push(BodyEvent::End(Element::LineBreak));
        } else {
            events.push(BodyEvent::Start(Element::Paragraph));
            in_paragraph = true;
        }
        events.push(BodyEvent::Text(line.to_string()));
    }

    if in_paragraph {
        events.push(BodyEvent::End(Element::Paragraph));
    }

    events
}
