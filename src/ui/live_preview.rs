//! Live editor: the clicked block shows raw markdown, the rest is rendered
//!
//! Heading positions from the last frame are kept in a [`RenderedDocument`],
//! which is what the outline scrolls and highlights.

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, FontId, ScrollArea, TextEdit, Ui};

use super::block_renderer::{render_block, BlockAction, BlockStyle};
use super::markdown_blocks::{parse_blocks, toggle_task, ParsedBlock};
use crate::core::outline::{DocumentView, HeadingHandle};

/// Heading geometry of the document currently on screen
#[derive(Debug, Default)]
pub struct RenderedDocument {
    heading_rects: Vec<egui::Rect>,
    pending_scroll: Option<usize>,
    highlight: Option<(usize, Instant)>,
}

impl RenderedDocument {
    /// Forget positions of the previous document
    pub fn reset(&mut self) {
        self.heading_rects.clear();
        self.pending_scroll = None;
        self.highlight = None;
    }

    /// Whether the heading at `index` is highlighted at `now`
    pub fn is_highlighted(&self, index: usize, now: Instant) -> bool {
        self.highlight
            .is_some_and(|(highlighted, until)| highlighted == index && now < until)
    }

    fn begin_frame(&mut self) {
        self.heading_rects.clear();
        if self.highlight.is_some_and(|(_, until)| Instant::now() >= until) {
            self.highlight = None;
        }
    }

    /// Record a rendered heading, scrolling and painting it as requested
    fn record_heading(&mut self, ui: &mut Ui, rect: egui::Rect) {
        let index = self.heading_rects.len();
        self.heading_rects.push(rect);

        if self.pending_scroll == Some(index) {
            ui.scroll_to_rect(rect, Some(egui::Align::TOP));
            self.pending_scroll = None;
        }

        let now = Instant::now();
        if let Some((highlighted, until)) = self.highlight {
            if highlighted == index && now < until {
                ui.painter().rect_filled(
                    rect.expand(2.0),
                    egui::CornerRadius::same(4),
                    ui.visuals().selection.bg_fill.gamma_multiply(0.35),
                );
                ui.ctx().request_repaint_after(until - now);
            }
        }
    }
}

impl DocumentView for RenderedDocument {
    fn query_heading_elements(&self) -> Vec<HeadingHandle> {
        (0..self.heading_rects.len()).map(HeadingHandle).collect()
    }

    fn scroll_into_view(&mut self, handle: HeadingHandle) {
        self.pending_scroll = Some(handle.0);
    }

    fn highlight(&mut self, handle: HeadingHandle, duration: Duration) {
        self.highlight = Some((handle.0, Instant::now() + duration));
    }
}

/// Result of one frame of the live editor
#[derive(Debug, Default)]
pub struct EditorOutput {
    /// New document content, when it changed
    pub content: Option<String>,
    pub action: Option<BlockAction>,
}

/// Live preview editor state
#[derive(Default)]
pub struct LivePreviewEditor {
    /// Tab the cached state belongs to
    tab_id: Option<String>,
    /// Cached parsed blocks
    parsed_blocks: Vec<ParsedBlock>,
    /// Cache of the content that was parsed (to detect changes)
    cached_content: String,
    /// Index of the block being edited (if any)
    editing_block: Option<usize>,
}

impl LivePreviewEditor {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_blocks(&mut self, tab_id: &str, content: &str) {
        if self.tab_id.as_deref() != Some(tab_id) {
            self.tab_id = Some(tab_id.to_string());
            self.editing_block = None;
            self.cached_content.clear();
            self.parsed_blocks.clear();
        }
        if content != self.cached_content || self.parsed_blocks.is_empty() {
            self.parsed_blocks = parse_blocks(content);
            self.cached_content = content.to_string();
        }
    }

    /// Source range of the block being edited, if any
    pub fn editing_range(&self) -> Option<std::ops::Range<usize>> {
        self.editing_block
            .and_then(|idx| self.parsed_blocks.get(idx))
            .map(ParsedBlock::range)
    }

    /// Show the live preview editor for `content` of tab `tab_id`
    pub fn show(
        &mut self,
        ui: &mut Ui,
        tab_id: &str,
        content: &str,
        style: BlockStyle,
        view: &mut RenderedDocument,
    ) -> EditorOutput {
        self.update_blocks(tab_id, content);
        view.begin_frame();

        let mut output = EditorOutput::default();
        let mut new_content: Option<String> = None;

        ScrollArea::vertical()
            .id_salt("live_preview_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());

                for (idx, block) in self.parsed_blocks.iter().enumerate() {
                    let is_editing = self.editing_block == Some(idx);
                    let block_range = block.range();

                    ui.push_id(idx, |ui| {
                        if is_editing {
                            let block_content = &content[block_range.clone()];
                            let mut edit_text = block_content.to_string();

                            let text_response = ui.add(
                                TextEdit::multiline(&mut edit_text)
                                    .font(FontId::monospace(style.font_size))
                                    .desired_width(ui.available_width())
                                    .frame(true)
                                    .margin(egui::Margin::same(4)),
                            );
                            if block.is_heading() {
                                view.record_heading(ui, text_response.rect);
                            }

                            if edit_text != block_content {
                                new_content = Some(format!(
                                    "{}{}{}",
                                    &content[..block_range.start],
                                    edit_text,
                                    &content[block_range.end..]
                                ));
                            }

                            if text_response.clicked_elsewhere() {
                                self.editing_block = None;
                            }
                        } else {
                            // The scope senses clicks underneath links and checkboxes
                            let inner = ui.scope_builder(egui::UiBuilder::new().sense(egui::Sense::click()), |ui| {
                                egui::Frame::new()
                                    .inner_margin(egui::Margin::same(4))
                                    .show(ui, |ui| render_block(ui, block, style))
                                    .inner
                            });
                            let response = inner.response;
                            let rect = response.rect;
                            if let Some(a) = inner.inner {
                                output.action = Some(a);
                            }
                            if block.is_heading() {
                                view.record_heading(ui, rect);
                            }

                            // Click to start editing this block
                            if response.clicked() && output.action.is_none() {
                                self.editing_block = Some(idx);
                            }

                            if response.hovered() {
                                ui.painter().rect_stroke(
                                    rect,
                                    egui::CornerRadius::same(4),
                                    egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(100, 100, 100, 50)),
                                    egui::StrokeKind::Outside,
                                );
                            }
                        }
                    });
                }

                // Space at the bottom starts a new paragraph
                let (rect, add_response) =
                    ui.allocate_exact_size(egui::vec2(ui.available_width(), 50.0), egui::Sense::click());

                if add_response.clicked() && new_content.is_none() {
                    let mut extended = content.trim_end().to_string();
                    if !extended.is_empty() {
                        extended.push_str("\n\n");
                    }
                    extended.push_str("New paragraph\n");
                    new_content = Some(extended);
                    self.editing_block = Some(self.parsed_blocks.len());
                }

                if add_response.hovered() {
                    ui.painter().rect_stroke(
                        rect,
                        egui::CornerRadius::same(4),
                        egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(100, 100, 100, 30)),
                        egui::StrokeKind::Outside,
                    );
                }
            });

        if let Some(BlockAction::ToggleTask(range)) = &output.action {
            if let Some(toggled) = toggle_task(content, range.clone()) {
                new_content = Some(toggled);
            }
            output.action = None;
        }

        if let Some(updated) = new_content {
            self.parsed_blocks = parse_blocks(&updated);
            self.cached_content = updated.clone();
            if self.editing_block.is_some_and(|idx| idx >= self.parsed_blocks.len()) {
                self.editing_block = None;
            }
            output.content = Some(updated);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outline::{scroll_to_heading, HIGHLIGHT_DURATION};

    fn rect(y: f32) -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, y), egui::vec2(100.0, 20.0))
    }

    #[test]
    fn test_scroll_to_heading_targets_rendered_position() {
        let mut view = RenderedDocument::default();
        view.heading_rects = vec![rect(0.0), rect(40.0), rect(80.0)];

        assert!(scroll_to_heading(&mut view, 2));
        assert_eq!(view.pending_scroll, Some(2));
        let now = Instant::now();
        assert!(view.is_highlighted(2, now));
        assert!(!view.is_highlighted(1, now));
        assert!(!view.is_highlighted(2, now + HIGHLIGHT_DURATION));
    }

    #[test]
    fn test_scroll_out_of_range_is_ignored() {
        let mut view = RenderedDocument::default();
        view.heading_rects = vec![rect(0.0)];
        assert!(!scroll_to_heading(&mut view, 3));
        assert_eq!(view.pending_scroll, None);
        assert!(view.highlight.is_none());
    }

    #[test]
    fn test_reset_clears_pending_state() {
        let mut view = RenderedDocument::default();
        view.heading_rects = vec![rect(0.0)];
        scroll_to_heading(&mut view, 0);
        view.reset();
        assert!(view.query_heading_elements().is_empty());
        assert_eq!(view.pending_scroll, None);
    }
}
