// Quote stripping for reply-heavy mailing-list content.
//
// Replies usually carry an attribution line ("On Tue, Jun 25, 2013 at 5:31 PM,
// Someone <a@b.com> wrote:") and often the quoted text itself. Both would
// credit one participant with another's words.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Attribution line, possibly itself quoted.
static QUOTE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>* On ..., .+, .+wrote:").expect("static regex"));

/// A quoted line: one or more '>' then a space.
static QUOTED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>+ .*").expect("static regex"));

/// Which quote material to remove before tokenizing.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteStripper {
    /// Also remove quoted lines, not just attribution lines
    pub strip_quoted_lines: bool,
}

impl QuoteStripper {
    pub fn apply(&self, content: &str) -> String {
        let without_headers = QUOTE_HEADER.replace_all(content, "");
        if self.strip_quoted_lines {
            QUOTED_LINE.replace_all(&without_headers, "").into_owned()
        } else {
            without_headers.into_owned()
        }
    }
}
