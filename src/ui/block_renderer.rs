//! Block rendering for the live editor

use std::ops::Range;

use eframe::egui::{self, Color32, FontId, RichText, Ui};

use super::markdown_blocks::{InlineSpan, ListItem, ParsedBlock, TableAlignment};

/// Action that can be triggered by block interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    /// Open external URL
    OpenUrl(String),
    /// Flip the task checkbox whose marker is in this source range
    ToggleTask(Range<usize>),
}

/// Font settings for rendered blocks
#[derive(Debug, Clone, Copy)]
pub struct BlockStyle {
    /// Body font size; headings scale from it
    pub font_size: f32,
}

impl BlockStyle {
    pub fn heading_size(&self, level: u8) -> f32 {
        let scale = match level {
            1 => 2.0,
            2 => 1.7,
            3 => 1.4,
            4 => 1.25,
            5 => 1.1,
            _ => 1.0,
        };
        self.font_size * scale
    }
}

/// Render a parsed block to the UI
pub fn render_block(ui: &mut Ui, block: &ParsedBlock, style: BlockStyle) -> Option<BlockAction> {
    match block {
        ParsedBlock::Heading { level, text, .. } => {
            render_heading(ui, *level, text, style);
            None
        }
        ParsedBlock::Paragraph { spans, .. } => render_paragraph(ui, spans, style),
        ParsedBlock::CodeBlock { lang, code, .. } => {
            render_code_block(ui, lang.as_deref(), code, style);
            None
        }
        ParsedBlock::List {
            items,
            ordered,
            start,
            ..
        } => {
            let action = render_list(ui, items, *ordered, *start, style);
            ui.add_space(8.0);
            action
        }
        ParsedBlock::BlockQuote { spans, .. } => render_blockquote(ui, spans, style),
        ParsedBlock::HorizontalRule { .. } => {
            render_horizontal_rule(ui);
            None
        }
        ParsedBlock::Table {
            alignments,
            headers,
            rows,
            ..
        } => {
            render_table(ui, alignments, headers, rows);
            None
        }
        ParsedBlock::Image { alt, url, title, .. } => {
            render_image(ui, alt, url, title.as_deref(), style);
            None
        }
    }
}

/// Render a heading
pub fn render_heading(ui: &mut Ui, level: u8, text: &str, style: BlockStyle) {
    let color = ui.visuals().strong_text_color();
    ui.add_space(4.0);
    ui.label(
        RichText::new(text)
            .font(FontId::proportional(style.heading_size(level)))
            .color(color)
            .strong(),
    );
    ui.add_space(match level {
        1 => 12.0,
        2 => 10.0,
        _ => 6.0,
    });
}

fn span_text(ui: &Ui, span: &InlineSpan, style: BlockStyle) -> RichText {
    let mut text = if span.style.code {
        RichText::new(&span.text)
            .font(FontId::monospace(style.font_size - 1.0))
            .background_color(ui.visuals().code_bg_color)
    } else {
        RichText::new(&span.text).font(FontId::proportional(style.font_size))
    };
    if span.style.strong {
        text = text.strong();
    }
    if span.style.emphasis {
        text = text.italics();
    }
    if span.style.strikethrough {
        text = text.strikethrough();
    }
    text
}

/// Lay out styled spans, returning a clicked link
fn render_spans(ui: &mut Ui, spans: &[InlineSpan], style: BlockStyle) -> Option<BlockAction> {
    let mut action = None;
    for span in spans {
        let text = span_text(ui, span, style);
        match &span.link {
            Some(url) => {
                let response = ui.link(text).on_hover_text(url);
                if response.clicked() {
                    action = Some(BlockAction::OpenUrl(url.clone()));
                }
            }
            None => {
                ui.label(text);
            }
        }
    }
    action
}

/// Render a paragraph with inline formatting
pub fn render_paragraph(ui: &mut Ui, spans: &[InlineSpan], style: BlockStyle) -> Option<BlockAction> {
    let action = ui
        .horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            render_spans(ui, spans, style)
        })
        .inner;
    ui.add_space(8.0);
    action
}

pub fn render_code_block(ui: &mut Ui, lang: Option<&str>, code: &str, style: BlockStyle) {
    let visuals = ui.visuals().clone();

    egui::Frame::new()
        .fill(visuals.extreme_bg_color)
        .stroke(visuals.widgets.noninteractive.bg_stroke)
        .inner_margin(egui::Margin::same(8))
        .outer_margin(egui::Margin::symmetric(0, 4))
        .corner_radius(4)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            if let Some(lang) = lang {
                ui.label(
                    RichText::new(lang)
                        .font(FontId::monospace(style.font_size - 2.0))
                        .color(visuals.weak_text_color()),
                );
                ui.add_space(4.0);
            }
            ui.label(RichText::new(code.trim_end()).font(FontId::monospace(style.font_size)));
        });

    ui.add_space(8.0);
}

/// Render a list (ordered or unordered)
pub fn render_list(
    ui: &mut Ui,
    items: &[ListItem],
    ordered: bool,
    start: Option<u64>,
    style: BlockStyle,
) -> Option<BlockAction> {
    let mut action = None;
    let start_num = start.unwrap_or(1);
    let marker_color = ui.visuals().weak_text_color();

    for (idx, item) in items.iter().enumerate() {
        ui.horizontal_wrapped(|ui| {
            ui.add_space(16.0);

            if let Some(checked) = item.checkbox {
                let mut state = checked;
                if ui.checkbox(&mut state, "").changed() {
                    if let Some(range) = item.checkbox_range.clone() {
                        action = Some(BlockAction::ToggleTask(range));
                    }
                }
            } else if ordered {
                ui.label(RichText::new(format!("{}.", start_num + idx as u64)).color(marker_color));
            } else {
                ui.label(RichText::new("\u{2022}").color(marker_color));
            }

            ui.spacing_mut().item_spacing.x = 0.0;
            if let Some(a) = render_spans(ui, &item.spans, style) {
                action = Some(a);
            }
        });

        if !item.children.is_empty() {
            ui.horizontal(|ui| {
                ui.add_space(16.0);
                ui.vertical(|ui| {
                    if let Some(a) = render_list(ui, &item.children, item.ordered_children, None, style) {
                        action = Some(a);
                    }
                });
            });
        }
    }

    action
}

pub fn render_blockquote(ui: &mut Ui, spans: &[InlineSpan], style: BlockStyle) -> Option<BlockAction> {
    let visuals = ui.visuals().clone();
    let response = egui::Frame::new()
        .fill(visuals.faint_bg_color)
        .inner_margin(egui::Margin {
            left: 12,
            right: 8,
            top: 8,
            bottom: 8,
        })
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                render_spans(ui, spans, style)
            })
            .inner
        });

    // Left border
    let rect = response.response.rect;
    ui.painter().rect_filled(
        egui::Rect::from_min_size(rect.min, egui::vec2(4.0, rect.height())),
        0.0,
        visuals.selection.bg_fill,
    );

    ui.add_space(8.0);
    response.inner
}

pub fn render_horizontal_rule(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);
}

pub fn render_table(ui: &mut Ui, alignments: &[TableAlignment], headers: &[String], rows: &[Vec<String>]) {
    use egui_extras::{Column, TableBuilder};

    let num_cols = headers.len().max(1);
    let layout = |col: usize| match alignments.get(col).copied().unwrap_or_default() {
        TableAlignment::Left => egui::Layout::left_to_right(egui::Align::Center),
        TableAlignment::Center => egui::Layout::centered_and_justified(egui::Direction::LeftToRight),
        TableAlignment::Right => egui::Layout::right_to_left(egui::Align::Center),
    };

    ui.push_id(ui.next_auto_id(), |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().at_least(60.0), num_cols)
            .header(20.0, |mut header| {
                for (col, cell) in headers.iter().enumerate() {
                    header.col(|ui| {
                        ui.with_layout(layout(col), |ui| {
                            ui.strong(cell);
                        });
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut row_ui| {
                        for (col, cell) in row.iter().enumerate() {
                            row_ui.col(|ui| {
                                ui.with_layout(layout(col), |ui| {
                                    ui.label(cell);
                                });
                            });
                        }
                    });
                }
            });
    });

    ui.add_space(8.0);
}

/// Remote images load through the installed loaders; anything else is a card
pub fn render_image(ui: &mut Ui, alt: &str, url: &str, title: Option<&str>, style: BlockStyle) {
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = ui.add(egui::Image::new(url).max_width(ui.available_width()).alt_text(alt));
        if let Some(title) = title {
            response.on_hover_text(title);
        }
        ui.add_space(8.0);
        return;
    }

    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .stroke(egui::Stroke::new(1.0, Color32::from_gray(110)))
        .inner_margin(egui::Margin::same(8))
        .corner_radius(4)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("\u{1F5BC}").font(FontId::proportional(24.0)));
                ui.vertical(|ui| {
                    if !alt.is_empty() {
                        ui.label(RichText::new(alt).italics());
                    }
                    ui.label(
                        RichText::new(url)
                            .font(FontId::monospace(style.font_size - 2.0))
                            .color(ui.visuals().weak_text_color()),
                    );
                });
            });
        });

    ui.add_space(8.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_sizes_scale_with_font() {
        let style = BlockStyle { font_size: 14.0 };
        assert_eq!(style.heading_size(1), 28.0);
        assert!(style.heading_size(2) > style.heading_size(3));
        assert_eq!(style.heading_size(6), 14.0);
    }
}
