// Body text extraction policy.
//
// The message parser reports the body as a stream of structural events
// (element start/end plus text runs). The collector below decides which text
// is kept: only text inside paragraphs, never text inside quotations.

/// Structural elements a parser can report in a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Paragraph,
    Quote,
    LineBreak,
    Other,
}

impl Element {
    /// Map an (X)HTML-style element name onto the elements the policy cares about.
    pub fn from_tag(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "p" => Element::Paragraph,
            "q" | "blockquote" => Element::Quote,
            "br" => Element::LineBreak,
            _ => Element::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEvent {
    Start(Element),
    End(Element),
    Text(String),
}

/// Accumulates kept body text from a stream of events.
#[derive(Debug, Default)]
pub struct BodyTextCollector {
    in_paragraph: bool,
    quote_depth: usize,
    content: String,
}

impl BodyTextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: &BodyEvent) {
        match event {
            BodyEvent::Start(Element::Paragraph) => self.in_paragraph = true,
            BodyEvent::Start(Element::Quote) => self.quote_depth += 1,
            BodyEvent::Start(Element::LineBreak) => self.content.push('\n'),
            BodyEvent::End(Element::Paragraph) => {
                self.in_paragraph = false;
                self.content.push('\n');
            }
            BodyEvent::End(Element::Quote) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            BodyEvent::Text(text) => {
                if self.in_paragraph && self.quote_depth == 0 {
                    self.content.push_str(text);
                    // Inline runs arrive without separators; keep words apart.
                    self.content.push(' ');
                }
            }
            BodyEvent::Start(_) | BodyEvent::End(_) => {}
        }
    }

    pub fn finish(self) -> String {
        self.content
    }

    /// Run a complete event stream through a fresh collector.
    pub fn collect<'a, I>(events: I) -> String
    where
        I: IntoIterator<Item = &'a BodyEvent>,
    {
        let mut collector = Self::new();
        for event in events {
            collector.handle(event);
        }
        collector.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> BodyEvent {
        BodyEvent::Text(s.to_string())
    }

    #[test]
    fn test_keeps_paragraph_text_only() {
        let events = vec![
            text("outside"),
            BodyEvent::Start(Element::Paragraph),
            text("hello"),
            text("world"),
            BodyEvent::End(Element::Paragraph),
        ];
        assert_eq!(BodyTextCollector::collect(&events), "hello world \n");
    }

    #[test]
    fn test_suppresses_quotes() {
        let events = vec![
            BodyEvent::Start(Element::Paragraph),
            text("mine"),
            BodyEvent::Start(Element::Quote),
            text("theirs"),
            BodyEvent::End(Element::Quote),
            text("again"),
            BodyEvent::End(Element::Paragraph),
        ];
        assert_eq!(BodyTextCollector::collect(&events), "mine again \n");
    }

    #[test]
    fn test_line_break_inserts_newline() {
        let events = vec![
            BodyEvent::Start(Element::Paragraph),
            text("a"),
            BodyEvent::Start(Element::LineBreak),
            BodyEvent::End(Element::LineBreak),
            text("b"),
            BodyEvent::End(Element::Paragraph),
        ];
        assert_eq!(BodyTextCollector::collect(&events), "a \nb \n");
    }

    #[test]
    fn test_element_from_tag() {
        assert_eq!(Element::from_tag("P"), Element::Paragraph);
        assert_eq!(Element::from_tag("q"), Element::Quote);
        assert_eq!(Element::from_tag("br"), Element::LineBreak);
        assert_eq!(Element::from_tag("meta"), Element::Other);
    }
}
