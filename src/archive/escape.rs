// Escaping for the flat record format.
//
// Message content is stored one record per line with tab-separated fields,
// so line terminators and tabs inside the content are rewritten as the
// two-character sequences `\n` and `\t`.

/// Escape line terminators and tabs in message content.
///
/// CRLF pairs collapse to a single `\n` sequence; the pair must be handled
/// before lone CR / LF characters or it would become two sequences.
pub fn escape_content(content: &str) -> String {
    content
        .replace("\r\n", "\\n")
        .replace(['\r', '\n'], "\\n")
        .replace('\t', "\\t")
}

/// Reverse `escape_content`.
///
/// Only exact for content that never contained a literal backslash followed
/// by `n` or `t` before escaping.
pub fn unescape_content(content: &str) -> String {
    content.replace("\\n", "\n").replace("\\t", "\t")
}
