//! In-memory documents and their HTML markup

use pulldown_cmark::{html, Event, Options, Parser};

/// Markdown extensions enabled for every document
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Serialize markdown source to HTML markup.
///
/// Raw HTML in the source is escaped, so only markdown headings become
/// heading elements.
pub fn render_markup(source: &str) -> String {
    let parser = Parser::new_ext(source, markdown_options()).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        other => other,
    });
    let mut markup = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut markup, parser);
    markup
}

/// Number of words in the rendered text of a document
pub fn word_count(source: &str) -> usize {
    Parser::new_ext(source, markdown_options())
        .map(|event| match event {
            Event::Text(text) | Event::Code(text) => text.split_whitespace().count(),
            _ => 0,
        })
        .sum()
}

/// A document backing a file in the tree
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Markdown source
    pub content: String,
    /// Whether the document was edited this session
    pub modified: bool,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            modified: false,
        }
    }

    /// Update content and mark as modified
    pub fn set_content(&mut self, content: String) {
        if self.content != content {
            self.content = content;
            self.modified = true;
        }
    }

    pub fn markup(&self) -> String {
        render_markup(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markup_headings_and_tasks() {
        let markup = render_markup("# Title\n\n- [x] done\n- [ ] todo\n\n#\n");
        assert!(markup.contains("<h1>Title</h1>"));
        assert!(markup.contains("checkbox"));
        assert!(markup.contains("<h1></h1>"));
    }

    #[test]
    fn test_render_markup_escapes_raw_html() {
        let markup = render_markup("<h2>Raw</h2>\n\n# Next <b>bold</b>\n");
        assert!(!markup.contains("<h2>"));
        assert!(markup.contains("&lt;h2&gt;Raw&lt;/h2&gt;"));
        assert!(markup.contains("<h1>Next &lt;b&gt;bold&lt;/b&gt;</h1>"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("# Hello world\n\nThree `more` words"), 5);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_set_content_marks_modified() {
        let mut doc = Document::new("a");
        doc.set_content("a".to_string());
        assert!(!doc.modified);
        doc.set_content("b".to_string());
        assert!(doc.modified);
        assert_eq!(doc.markup(), "<p>b</p>\n");
    }
}
