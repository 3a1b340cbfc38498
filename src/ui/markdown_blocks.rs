//! Markdown block parsing for the live editor
//!
//! Content is split into top-level blocks with byte ranges so the block
//! being edited can show raw markdown while the rest is rendered.
//!
//! Every heading element becomes exactly one `Heading` block, in document
//! order, including empty and quoted headings. Outline indices rely on this.
//! Raw HTML is plain text here and in the markup, so it never adds headings.

use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Parser, Tag, TagEnd};

use crate::core::document::markdown_options;

/// Character styling of an inline span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
}

/// A run of text with one style, optionally a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    pub text: String,
    pub style: InlineStyle,
    pub link: Option<String>,
}

/// A list item with potential checkbox state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    pub spans: Vec<InlineSpan>,
    /// Checkbox state: Some(true) = checked, Some(false) = unchecked, None = no checkbox
    pub checkbox: Option<bool>,
    /// Source range of the checkbox marker
    pub checkbox_range: Option<Range<usize>>,
    /// Nested items (for sublists)
    pub children: Vec<ListItem>,
    pub ordered_children: bool,
}

/// Table column alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<Alignment> for TableAlignment {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::Center => TableAlignment::Center,
            Alignment::Right => TableAlignment::Right,
            Alignment::None | Alignment::Left => TableAlignment::Left,
        }
    }
}

/// A parsed markdown block with its byte range in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedBlock {
    Heading {
        level: u8,
        text: String,
        range: Range<usize>,
    },

    Paragraph {
        spans: Vec<InlineSpan>,
        range: Range<usize>,
    },

    /// Fenced or indented code block
    CodeBlock {
        lang: Option<String>,
        code: String,
        range: Range<usize>,
    },

    /// Unordered or ordered list
    List {
        items: Vec<ListItem>,
        ordered: bool,
        start: Option<u64>,
        range: Range<usize>,
    },

    /// Block quote, flattened to its inline text
    BlockQuote {
        spans: Vec<InlineSpan>,
        range: Range<usize>,
    },

    HorizontalRule {
        range: Range<usize>,
    },

    Table {
        alignments: Vec<TableAlignment>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        range: Range<usize>,
    },

    /// Image on its own line
    Image {
        alt: String,
        url: String,
        title: Option<String>,
        range: Range<usize>,
    },
}

impl ParsedBlock {
    /// Get the byte range of this block in the source
    pub fn range(&self) -> Range<usize> {
        match self {
            ParsedBlock::Heading { range, .. }
            | ParsedBlock::Paragraph { range, .. }
            | ParsedBlock::CodeBlock { range, .. }
            | ParsedBlock::List { range, .. }
            | ParsedBlock::BlockQuote { range, .. }
            | ParsedBlock::HorizontalRule { range }
            | ParsedBlock::Table { range, .. }
            | ParsedBlock::Image { range, .. } => range.clone(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, ParsedBlock::Heading { .. })
    }
}

/// Accumulates styled inline text
#[derive(Debug, Default)]
struct InlineBuilder {
    spans: Vec<InlineSpan>,
    style: InlineStyle,
    link: Option<String>,
}

impl InlineBuilder {
    fn push(&mut self, text: &str, code: bool) {
        let style = InlineStyle { code, ..self.style };
        if let Some(last) = self.spans.last_mut() {
            if last.style == style && last.link == self.link {
                last.text.push_str(text);
                return;
            }
        }
        self.spans.push(InlineSpan {
            text: text.to_string(),
            style,
            link: self.link.clone(),
        });
    }

    fn take(&mut self) -> Vec<InlineSpan> {
        self.style = InlineStyle::default();
        self.link = None;
        std::mem::take(&mut self.spans)
    }

    fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }
}

/// Concatenated text of a span list
pub fn plain_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

struct ListFrame {
    ordered: bool,
    start: Option<u64>,
    items: Vec<ListItem>,
    block_start: usize,
}

struct ItemFrame {
    item: ListItem,
    inline: InlineBuilder,
}

struct TableFrame {
    alignments: Vec<TableAlignment>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Option<String>,
    block_start: usize,
}

struct PendingImage {
    url: String,
    title: Option<String>,
    alt: String,
    range: Range<usize>,
}

#[derive(Default)]
struct BlockParser {
    blocks: Vec<ParsedBlock>,
    inline: InlineBuilder,
    paragraph_start: usize,
    heading: Option<(u8, String, usize)>,
    code: Option<(Option<String>, String, usize)>,
    quote_depth: usize,
    quote_start: usize,
    lists: Vec<ListFrame>,
    items: Vec<ItemFrame>,
    table: Option<TableFrame>,
    image: Option<PendingImage>,
    images: Vec<PendingImage>,
}

impl BlockParser {
    /// Text goes to the innermost open container
    fn push_text(&mut self, text: &str, code: bool) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push_str(text);
        } else if let Some((_, heading, _)) = self.heading.as_mut() {
            heading.push_str(text);
        } else if let Some((_, body, _)) = self.code.as_mut() {
            body.push_str(text);
        } else if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.push_str(text);
        } else if let Some(frame) = self.items.last_mut() {
            frame.inline.push(text, code);
        } else {
            self.inline.push(text, code);
        }
    }

    fn inline_mut(&mut self) -> &mut InlineBuilder {
        match self.items.last_mut() {
            Some(frame) => &mut frame.inline,
            None => &mut self.inline,
        }
    }

    fn in_container(&self) -> bool {
        self.quote_depth > 0 || !self.items.is_empty() || self.table.is_some()
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.heading = Some((level as u8, String::new(), range.start));
            }
            Tag::Paragraph | Tag::HtmlBlock => {
                if !self.in_container() {
                    self.paragraph_start = range.start;
                    self.inline.take();
                }
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((lang, String::new(), range.start));
            }
            Tag::BlockQuote(_) => {
                if self.quote_depth == 0 {
                    self.quote_start = range.start;
                    self.inline.take();
                }
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.lists.push(ListFrame {
                    ordered: start.is_some(),
                    start,
                    items: Vec::new(),
                    block_start: range.start,
                });
            }
            Tag::Item => {
                self.items.push(ItemFrame {
                    item: ListItem::default(),
                    inline: InlineBuilder::default(),
                });
            }
            Tag::Table(alignments) => {
                self.table = Some(TableFrame {
                    alignments: alignments.into_iter().map(TableAlignment::from).collect(),
                    headers: Vec::new(),
                    rows: Vec::new(),
                    row: Vec::new(),
                    cell: None,
                    block_start: range.start,
                });
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell = Some(String::new());
                }
            }
            Tag::Emphasis => self.inline_mut().style.emphasis = true,
            Tag::Strong => self.inline_mut().style.strong = true,
            Tag::Strikethrough => self.inline_mut().style.strikethrough = true,
            Tag::Link { dest_url, .. } => self.inline_mut().link = Some(dest_url.to_string()),
            Tag::Image { dest_url, title, .. } => {
                self.image = Some(PendingImage {
                    url: dest_url.to_string(),
                    title: (!title.is_empty()).then(|| title.to_string()),
                    alt: String::new(),
                    range,
                });
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd, range: Range<usize>) {
        match tag {
            TagEnd::Heading(_) => {
                if let Some((level, text, start)) = self.heading.take() {
                    self.blocks.push(ParsedBlock::Heading {
                        level,
                        text: text.trim().to_string(),
                        range: start..range.end,
                    });
                }
            }
            TagEnd::Paragraph | TagEnd::HtmlBlock => {
                if self.quote_depth > 0 && self.items.is_empty() {
                    self.inline.push("\n", false);
                } else if !self.in_container() {
                    self.finish_paragraph(range.end);
                }
            }
            TagEnd::CodeBlock => {
                if let Some((lang, code, start)) = self.code.take() {
                    self.blocks.push(ParsedBlock::CodeBlock {
                        lang,
                        code,
                        range: start..range.end,
                    });
                }
            }
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    let mut spans = self.inline.take();
                    if let Some(last) = spans.last_mut() {
                        last.text = last.text.trim_end().to_string();
                    }
                    self.blocks.push(ParsedBlock::BlockQuote {
                        spans,
                        range: self.quote_start..range.end,
                    });
                }
            }
            TagEnd::Item => {
                if let Some(mut frame) = self.items.pop() {
                    frame.item.spans = frame.inline.take();
                    if let Some(list) = self.lists.last_mut() {
                        list.items.push(frame.item);
                    }
                }
            }
            TagEnd::List(_) => {
                let Some(list) = self.lists.pop() else {
                    return;
                };
                match self.items.last_mut() {
                    Some(parent) => {
                        parent.item.ordered_children = list.ordered;
                        parent.item.children = list.items;
                    }
                    None => self.blocks.push(ParsedBlock::List {
                        items: list.items,
                        ordered: list.ordered,
                        start: list.start,
                        range: list.block_start..range.end,
                    }),
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = table.cell.take().unwrap_or_default();
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.headers = std::mem::take(&mut table.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(ParsedBlock::Table {
                        alignments: table.alignments,
                        headers: table.headers,
                        rows: table.rows,
                        range: table.block_start..range.end,
                    });
                }
            }
            TagEnd::Emphasis => self.inline_mut().style.emphasis = false,
            TagEnd::Strong => self.inline_mut().style.strong = false,
            TagEnd::Strikethrough => self.inline_mut().style.strikethrough = false,
            TagEnd::Link => self.inline_mut().link = None,
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    if self.in_container() || self.heading.is_some() {
                        let alt = image.alt.clone();
                        self.push_text(&alt, false);
                    } else {
                        self.images.push(image);
                    }
                }
            }
            _ => {}
        }
    }

    /// Paragraphs holding only images become image blocks
    fn finish_paragraph(&mut self, end: usize) {
        let images = std::mem::take(&mut self.images);
        if !self.inline.is_blank() || images.is_empty() {
            let spans = self.inline.take();
            self.blocks.push(ParsedBlock::Paragraph {
                spans,
                range: self.paragraph_start..end,
            });
        } else {
            self.inline.take();
        }
        for image in images {
            self.blocks.push(ParsedBlock::Image {
                alt: image.alt,
                url: image.url,
                title: image.title,
                range: image.range,
            });
        }
    }
}

/// Parse markdown content into blocks
pub fn parse_blocks(content: &str) -> Vec<ParsedBlock> {
    let mut parser = BlockParser::default();

    for (event, range) in Parser::new_ext(content, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(tag) => parser.start(tag, range),
            Event::End(tag) => parser.end(tag, range),
            Event::Text(text) => parser.push_text(&text, false),
            Event::Code(code) => parser.push_text(&code, true),
            // Raw HTML is shown as written, matching the escaped markup
            Event::Html(html) | Event::InlineHtml(html) => parser.push_text(&html, false),
            Event::SoftBreak => parser.push_text(" ", false),
            Event::HardBreak => parser.push_text("\n", false),
            Event::Rule => {
                if !parser.in_container() {
                    parser.blocks.push(ParsedBlock::HorizontalRule { range });
                }
            }
            Event::TaskListMarker(checked) => {
                if let Some(frame) = parser.items.last_mut() {
                    frame.item.checkbox = Some(checked);
                    frame.item.checkbox_range = Some(range);
                }
            }
            _ => {}
        }
    }

    parser.blocks
}

/// Flip the task marker found at or after `range.start`.
///
/// Returns the new content, or `None` when no marker is there.
pub fn toggle_task(content: &str, range: Range<usize>) -> Option<String> {
    let slice = content.get(range.clone())?;
    let offset = slice.find('[')?;
    let start = range.start + offset;
    let marker = content.get(start..start + 3)?;
    let replacement = match marker {
        "[ ]" => "[x]",
        "[x]" | "[X]" => "[ ]",
        _ => return None,
    };
    let mut toggled = String::with_capacity(content.len());
    toggled.push_str(&content[..start]);
    toggled.push_str(replacement);
    toggled.push_str(&content[start + 3..]);
    Some(toggled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::render_markup;
    use crate::core::outline::extract_headings;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_blocks_match_markup_headings() {
        let source = "# A\n\n#\n\ntext\n\n> ## Quoted\n> more\n\nSetext\n------\n";
        let blocks = parse_blocks(source);
        let headings: Vec<&ParsedBlock> = blocks.iter().filter(|b| b.is_heading()).collect();
        assert_eq!(headings.len(), 4);

        let extracted = extract_headings(&render_markup(source));
        let indices: Vec<usize> = extracted.iter().map(|h| h.sequence_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        match headings[2] {
            ParsedBlock::Heading { level, text, .. } => {
                assert_eq!(*level, 2);
                assert_eq!(text, "Quoted");
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_raw_html_headings_do_not_shift_outline_indices() {
        let source = "<h2>Raw</h2>\n\n# Next\n";
        let blocks = parse_blocks(source);
        let headings: Vec<&ParsedBlock> = blocks.iter().filter(|b| b.is_heading()).collect();
        assert_eq!(headings.len(), 1);

        let extracted = extract_headings(&render_markup(source));
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].text, "Next");
        assert_eq!(extracted[0].sequence_index, 0);

        let ParsedBlock::Paragraph { spans, .. } = &blocks[0] else {
            panic!("raw html should render as text");
        };
        assert_eq!(plain_text(spans).trim(), "<h2>Raw</h2>");
    }

    #[test]
    fn test_paragraph_spans_keep_links_and_styles() {
        let blocks = parse_blocks("Plain **bold** and [site](https://example.com) `code`\n");
        let ParsedBlock::Paragraph { spans, range } = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(range.start, 0);
        assert_eq!(plain_text(spans), "Plain bold and site code");
        assert!(spans.iter().any(|s| s.text == "bold" && s.style.strong));
        assert!(spans
            .iter()
            .any(|s| s.text == "site" && s.link.as_deref() == Some("https://example.com")));
        assert!(spans.iter().any(|s| s.text == "code" && s.style.code));
    }

    #[test]
    fn test_nested_lists_and_tasks() {
        let blocks = parse_blocks("- [x] done\n- parent\n  1. child\n  2. second\n");
        assert_eq!(blocks.len(), 1);
        let ParsedBlock::List { items, ordered, .. } = &blocks[0] else {
            panic!("expected list");
        };
        assert!(!ordered);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].checkbox, Some(true));
        assert_eq!(plain_text(&items[0].spans), "done");
        assert_eq!(items[1].children.len(), 2);
        assert!(items[1].ordered_children);
        assert_eq!(plain_text(&items[1].children[1].spans), "second");
    }

    #[test]
    fn test_table_and_image_blocks() {
        let source = "| A | B |\n|:-:|--:|\n| 1 | 2 |\n\n![alt text](pic.png)\n";
        let blocks = parse_blocks(source);
        assert_eq!(
            blocks[0],
            ParsedBlock::Table {
                alignments: vec![TableAlignment::Center, TableAlignment::Right],
                headers: vec!["A".to_string(), "B".to_string()],
                rows: vec![vec!["1".to_string(), "2".to_string()]],
                range: blocks[0].range(),
            }
        );
        match &blocks[1] {
            ParsedBlock::Image { alt, url, .. } => {
                assert_eq!(alt, "alt text");
                assert_eq!(url, "pic.png");
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_block_ranges_cover_source() {
        let source = "# Title\n\nBody text\n\n---\n";
        let blocks = parse_blocks(source);
        assert_eq!(source[blocks[0].range()].trim_end(), "# Title");
        assert_eq!(source[blocks[1].range()].trim_end(), "Body text");
        assert!(matches!(blocks[2], ParsedBlock::HorizontalRule { .. }));
    }

    #[test]
    fn test_toggle_task() {
        let source = "- [ ] one\n- [x] two\n";
        assert_eq!(toggle_task(source, 0..9).as_deref(), Some("- [x] one\n- [x] two\n"));
        assert_eq!(toggle_task(source, 10..19).as_deref(), Some("- [ ] one\n- [ ] two\n"));
        assert_eq!(toggle_task("plain", 0..5), None);
        assert_eq!(toggle_task(source, 0..100), None);
    }
}
