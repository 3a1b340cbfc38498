//! Outline of the active document

use eframe::egui::{self, RichText, Ui};

use super::live_preview::RenderedDocument;
use crate::core::outline::{scroll_to_heading, HeadingNode, OutlineState};

enum OutlineAction {
    Toggle(String),
    Jump { id: String, sequence_index: usize },
}

pub struct OutlinePanel;

impl OutlinePanel {
    pub fn show(ui: &mut Ui, outline: &mut OutlineState, view: &mut RenderedDocument) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Outline").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let collapse_icon = if outline.is_collapsed() { "\u{25B8}" } else { "\u{25BE}" };
                if ui.small_button(collapse_icon).on_hover_text("Collapse outline").clicked() {
                    outline.toggle_collapsed();
                }
                let search_hint = if outline.query().is_empty() { "Search headings" } else { "Clear search" };
                if ui.small_button("\u{1F50D}").on_hover_text(search_hint).clicked() {
                    outline.press_search();
                }
            });
        });

        if outline.is_search_open() {
            ui.add(
                egui::TextEdit::singleline(outline.query_mut())
                    .hint_text("Filter headings")
                    .desired_width(f32::INFINITY),
            );
        }
        ui.separator();

        if outline.is_collapsed() {
            return;
        }

        let hierarchy = outline.visible_hierarchy();
        if hierarchy.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(30.0);
                let message = if outline.headings().is_empty() {
                    "No headings in this document"
                } else {
                    "No headings match"
                };
                ui.label(RichText::new(message).weak());
            });
            return;
        }

        let mut action = None;
        egui::ScrollArea::vertical()
            .id_salt("outline_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for node in &hierarchy {
                    Self::show_node(ui, node, 0, outline, &mut action);
                }
            });

        match action {
            Some(OutlineAction::Toggle(id)) => outline.toggle_node(&id),
            Some(OutlineAction::Jump { id, sequence_index }) => {
                outline.select(&id);
                scroll_to_heading(view, sequence_index);
            }
            None => {}
        }
    }

    fn show_node(
        ui: &mut Ui,
        node: &HeadingNode,
        depth: usize,
        outline: &OutlineState,
        action: &mut Option<OutlineAction>,
    ) {
        let heading = &node.heading;
        let expanded = outline.is_expanded(&heading.id);

        ui.horizontal(|ui| {
            ui.add_space(depth as f32 * 12.0);
            if node.children.is_empty() {
                ui.add_space(18.0);
            } else {
                let arrow = if expanded { "\u{25BE}" } else { "\u{25B8}" };
                if ui.small_button(arrow).clicked() {
                    *action = Some(OutlineAction::Toggle(heading.id.clone()));
                }
            }

            let selected = outline.selected() == Some(heading.id.as_str());
            let mut text = RichText::new(&heading.text);
            if heading.level == 1 {
                text = text.strong();
            }
            if ui.selectable_label(selected, text).clicked() {
                *action = Some(OutlineAction::Jump {
                    id: heading.id.clone(),
                    sequence_index: heading.sequence_index,
                });
            }
        });

        if expanded {
            for child in &node.children {
                Self::show_node(ui, child, depth + 1, outline, action);
            }
        }
    }
}
