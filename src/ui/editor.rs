//! Editor area: tab strip, start page and the live editor

use eframe::egui::{self, RichText, Ui};

use super::block_renderer::{BlockAction, BlockStyle};
use super::live_preview::{LivePreviewEditor, RenderedDocument};
use super::toolbar;
use crate::core::config::EditorConfig;
use crate::core::workspace::Workspace;

enum TabAction {
    Activate(String),
    Close(String),
    New,
}

/// Markdown editor panel
#[derive(Default)]
pub struct EditorPanel {
    live: LivePreviewEditor,
}

impl EditorPanel {
    pub fn show(&mut self, ui: &mut Ui, ws: &mut Workspace, view: &mut RenderedDocument, config: &EditorConfig) {
        Self::show_tabs(ui, ws);
        ui.separator();

        let Some(tab) = ws.tabs().active() else {
            return;
        };
        if tab.is_placeholder() {
            view.reset();
            Self::show_start_page(ui, ws);
            return;
        }

        let tab_id = tab.id.clone();
        let content = tab.content.clone().unwrap_or_default();

        if config.show_toolbar {
            if let Some(format) = toolbar::show(ui) {
                let updated = toolbar::apply_format(&content, self.live.editing_range(), format);
                ws.update_active_content(updated);
                return;
            }
        }

        let style = BlockStyle {
            font_size: config.font_size,
        };
        let output = self.live.show(ui, &tab_id, &content, style, view);

        if let Some(updated) = output.content {
            ws.update_active_content(updated);
        }
        if let Some(BlockAction::OpenUrl(url)) = output.action {
            if let Err(e) = open::that(&url) {
                tracing::error!("Failed to open {}: {}", url, e);
            }
        }
    }

    /// Show document tabs
    fn show_tabs(ui: &mut Ui, ws: &mut Workspace) {
        let mut action = None;

        egui::ScrollArea::horizontal()
            .id_salt("editor_tabs")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let active_id = ws.tabs().active_id();
                    for tab in ws.tabs().tabs() {
                        let is_active = tab.id == active_id;
                        let modified = tab.file_id().is_some_and(|id| ws.is_modified(id));
                        let title = if modified {
                            format!("{}*", tab.label)
                        } else {
                            tab.label.clone()
                        };

                        if ui.selectable_label(is_active, title).clicked() {
                            action = Some(TabAction::Activate(tab.id.clone()));
                        }
                        if is_active && ui.small_button("\u{2715}").on_hover_text("Close tab").clicked() {
                            action = Some(TabAction::Close(tab.id.clone()));
                        }
                        ui.separator();
                    }
                    if ui.small_button("+").on_hover_text("New tab (Ctrl+T)").clicked() {
                        action = Some(TabAction::New);
                    }
                });
            });

        match action {
            Some(TabAction::Activate(id)) => ws.activate_tab(&id),
            Some(TabAction::Close(id)) => ws.close_tab(&id),
            Some(TabAction::New) => ws.new_tab(),
            None => {}
        }
    }

    /// Start page shown in placeholder tabs
    fn show_start_page(ui: &mut Ui, ws: &mut Workspace) {
        let active_id = ws.tabs().active_id().to_string();

        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            ui.label(RichText::new("New Tab").heading());
            ui.add_space(20.0);

            if ui.button("\u{1F4C4} Create new file (Ctrl+N)").clicked() {
                ws.create_node(None, false);
            }
            if ui.button("\u{2715} Close tab (Ctrl+W)").clicked() {
                ws.close_tab(&active_id);
            }

            ui.add_space(20.0);
            ui.label(RichText::new("Pick a document in the library to start editing.").weak());
        });
    }
}
