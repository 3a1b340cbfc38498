//! Formatting toolbar above file-backed documents
//!
//! Formats apply to the block being edited, or append a template block
//! when nothing is being edited.

use std::ops::Range;

use eframe::egui::{self, RichText, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Heading(u8),
    Bold,
    Italic,
    Strikethrough,
    InlineCode,
    BulletList,
    OrderedList,
    TaskList,
    Quote,
    CodeBlock,
    Rule,
}

impl Format {
    fn template(self) -> String {
        match self {
            Format::Heading(level) => format!("{} Heading", "#".repeat(level as usize)),
            Format::Bold => "**bold text**".to_string(),
            Format::Italic => "*italic text*".to_string(),
            Format::Strikethrough => "~~struck text~~".to_string(),
            Format::InlineCode => "`code`".to_string(),
            Format::BulletList => "- item".to_string(),
            Format::OrderedList => "1. item".to_string(),
            Format::TaskList => "- [ ] task".to_string(),
            Format::Quote => "> quote".to_string(),
            Format::CodeBlock => "```\ncode\n```".to_string(),
            Format::Rule => "---".to_string(),
        }
    }

    fn wrapper(self) -> Option<&'static str> {
        match self {
            Format::Bold => Some("**"),
            Format::Italic => Some("*"),
            Format::Strikethrough => Some("~~"),
            Format::InlineCode => Some("`"),
            _ => None,
        }
    }
}

fn strip_heading(line: &str) -> &str {
    let stripped = line.trim_start_matches('#');
    if stripped.len() == line.len() {
        line
    } else {
        stripped.trim_start()
    }
}

fn prefix_lines(text: &str, prefix: impl Fn(usize) -> String) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", prefix(i), line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_block(block: &str, format: Format) -> String {
    if let Some(wrap) = format.wrapper() {
        return format!("{wrap}{}{wrap}", block.trim());
    }
    match format {
        Format::Heading(level) => {
            let mut lines = block.lines();
            let first = lines.next().unwrap_or_default();
            let rest: Vec<&str> = lines.collect();
            let mut heading = format!("{} {}", "#".repeat(level as usize), strip_heading(first));
            for line in rest {
                heading.push('\n');
                heading.push_str(line);
            }
            heading
        }
        Format::BulletList => prefix_lines(block, |_| "- ".to_string()),
        Format::OrderedList => prefix_lines(block, |i| format!("{}. ", i + 1)),
        Format::TaskList => prefix_lines(block, |_| "- [ ] ".to_string()),
        Format::Quote => prefix_lines(block, |_| "> ".to_string()),
        Format::CodeBlock => format!("```\n{}\n```", block.trim_end()),
        Format::Rule => format!("{}\n\n---", block.trim_end()),
        _ => block.to_string(),
    }
}

/// Apply a format to `content`, targeting `block` when given
pub fn apply_format(content: &str, block: Option<Range<usize>>, format: Format) -> String {
    match block.filter(|r| content.get(r.clone()).is_some()) {
        Some(range) => {
            let original = &content[range.clone()];
            let trailing = &original[original.trim_end().len()..];
            let formatted = format_block(original.trim_end(), format);
            format!("{}{}{}{}", &content[..range.start], formatted, trailing, &content[range.end..])
        }
        None => {
            let mut appended = content.trim_end().to_string();
            if !appended.is_empty() {
                appended.push_str("\n\n");
            }
            appended.push_str(&format.template());
            appended.push('\n');
            appended
        }
    }
}

/// Toolbar row; returns the clicked format
pub fn show(ui: &mut Ui) -> Option<Format> {
    let mut clicked = None;
    let mut button = |ui: &mut Ui, label: RichText, hover: &str, format: Format| {
        if ui.button(label).on_hover_text(hover).clicked() {
            clicked = Some(format);
        }
    };

    ui.horizontal_wrapped(|ui| {
        for level in 1..=3u8 {
            button(ui, RichText::new(format!("H{level}")), &format!("Heading {level}"), Format::Heading(level));
        }
        ui.separator();
        button(ui, RichText::new("B").strong(), "Bold", Format::Bold);
        button(ui, RichText::new("I").italics(), "Italic", Format::Italic);
        button(ui, RichText::new("S").strikethrough(), "Strikethrough", Format::Strikethrough);
        button(ui, RichText::new("</>").monospace(), "Inline code", Format::InlineCode);
        ui.separator();
        button(ui, RichText::new("\u{2022}"), "Bullet list", Format::BulletList);
        button(ui, RichText::new("1."), "Numbered list", Format::OrderedList);
        button(ui, RichText::new("\u{2611}"), "Task list", Format::TaskList);
        button(ui, RichText::new("\u{201C}"), "Quote", Format::Quote);
        button(ui, RichText::new("{ }").monospace(), "Code block", Format::CodeBlock);
        button(ui, RichText::new("\u{2014}"), "Divider", Format::Rule);
    });
    ui.add_space(2.0);
    ui.add(egui::Separator::default().horizontal());

    clicked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_replaces_existing_level() {
        let content = "## Old title\n\nBody\n";
        assert_eq!(apply_format(content, Some(0..13), Format::Heading(1)), "# Old title\n\nBody\n");
        assert_eq!(apply_format("Body\n", Some(0..5), Format::Heading(3)), "### Body\n");
    }

    #[test]
    fn test_wrap_formats_trim_block() {
        assert_eq!(apply_format("a\n\nword\n", Some(3..8), Format::Bold), "a\n\n**word**\n");
        assert_eq!(apply_format("x", Some(0..1), Format::InlineCode), "`x`");
    }

    #[test]
    fn test_line_prefixes() {
        assert_eq!(apply_format("one\ntwo\n", Some(0..8), Format::OrderedList), "1. one\n2. two\n");
        assert_eq!(apply_format("one\ntwo", Some(0..7), Format::Quote), "> one\n> two");
    }

    #[test]
    fn test_without_block_appends_template() {
        assert_eq!(apply_format("# T\n\n", None, Format::TaskList), "# T\n\n- [ ] task\n");
        assert_eq!(apply_format("", None, Format::Rule), "---\n");
        assert_eq!(apply_format("abc", Some(2..10), Format::Bold), "abc\n\n**bold text**\n");
    }
}
