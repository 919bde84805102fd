// Mbox segmentation — split one archive file into individual messages.
//
// Every line starting with "From " opens a new message. The boundary line
// itself belongs to the message it opens, so a record is the envelope line
// plus everything up to (but not including) the next envelope line.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::mem;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Prefix that marks the first line of a message in an mbox archive.
pub const BOUNDARY_PREFIX: &str = "From ";

/// The raw text of one message, newline-terminated lines included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub text: String,
}

/// Pull-based splitter over the lines of one archive.
///
/// A read error on any line ends the scan early; whatever was buffered up to
/// that point is still emitted as the final record.
pub struct ArchiveSegmenter<I> {
    lines: I,
    buffer: String,
    exhausted: bool,
}

impl<I> ArchiveSegmenter<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            buffer: String::new(),
            exhausted: false,
        }
    }

    fn take_record(&mut self) -> MessageRecord {
        MessageRecord {
            text: mem::take(&mut self.buffer),
        }
    }
}

impl<I> Iterator for ArchiveSegmenter<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = MessageRecord;

    fn next(&mut self) -> Option<MessageRecord> {
        while !self.exhausted {
            match self.lines.next() {
                Some(Ok(line)) => {
                    let finished = if line.starts_with(BOUNDARY_PREFIX) && !self.buffer.is_empty() {
                        Some(self.take_record())
                    } else {
                        None
                    };

                    self.buffer.push_str(&line);
                    self.buffer.push('\n');

                    if finished.is_some() {
                        return finished;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Read failure while splitting archive, truncating");
                    self.exhausted = true;
                }
                None => self.exhausted = true,
            }
        }

        if self.buffer.is_empty() {
            None
        } else {
            Some(self.take_record())
        }
    }
}

/// Line reader that never fails on encoding.
///
/// Mailing-list archives routinely mix charsets, so bytes that aren't valid
/// UTF-8 are replaced rather than aborting the file. A line ends at `\n`,
/// `\r\n` or a lone `\r`; the terminator is stripped.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    /// The previous line ended at `\r`; a `\n` right after it belongs to
    /// that terminator.
    skip_lf: bool,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            skip_lf: false,
        }
    }

    fn decode(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<io::Result<String>> {
        self.buf.clear();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            if available.is_empty() {
                break;
            }

            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    let terminator = available[end];
                    self.buf.extend_from_slice(&available[..end]);
                    self.reader.consume(end + 1);
                    self.skip_lf = terminator == b'\r';
                    return Some(Ok(self.decode()));
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }

        if self.buf.is_empty() {
            None
        } else {
            Some(Ok(self.decode()))
        }
    }
}

/// Open an archive file for segmentation.
///
/// Failing to open the file is fatal for the whole unit; read errors after
/// that point only truncate the scan.
pub fn open_archive(path: &Path) -> Result<ArchiveSegmenter<LossyLines<BufReader<File>>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open archive file {}", path.display()))?;
    Ok(ArchiveSegmenter::new(LossyLines::new(BufReader::new(file))))
}

/// Segment an in-memory list of lines. Handy for tests and small inputs.
pub fn segment_lines<S: AsRef<str>>(lines: &[S]) -> Vec<MessageRecord> {
    ArchiveSegmenter::new(lines.iter().map(|l| Ok(l.as_ref().to_string()))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_messages() {
        let records = segment_lines(&["From a", "hi", "From b", "bye"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "From a\nhi\n");
        assert_eq!(records[1].text, "From b\nbye\n");
    }

    #[test]
    fn test_read_error_flushes_buffer() {
        let lines = vec![
            Ok("From a".to_string()),
            Ok("partial".to_string()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "boom")),
            Ok("From b".to_string()),
        ];
        let records: Vec<_> = ArchiveSegmenter::new(lines.into_iter()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "From a\npartial\n");
    }

    #[test]
    fn test_lossy_lines_strips_crlf_and_replaces_bad_bytes() {
        let raw: &[u8] = b"From x\r\ncaf\xe9\nlast";
        let lines: Vec<String> = LossyLines::new(raw).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["From x", "caf\u{FFFD}", "last"]);
    }

    #[test]
    fn test_lone_cr_ends_line() {
        let raw: &[u8] = b"From a\rhi\rFrom b\r\nbye\n\nend";
        let lines: Vec<String> = LossyLines::new(raw).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["From a", "hi", "From b", "bye", "", "end"]);
    }

    #[test]
    fn test_crlf_split_across_reads() {
        let raw: &[u8] = b"one\r\ntwo\r\n";
        let reader = BufReader::with_capacity(4, raw);
        let lines: Vec<String> = LossyLines::new(reader).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_boundary_after_bare_cr() {
        let raw: &[u8] = b"From a\rhi\rFrom b\rbye\r";
        let records: Vec<_> = ArchiveSegmenter::new(LossyLines::new(raw)).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text, "From b\nbye\n");
    }
}
