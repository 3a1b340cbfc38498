//! Library tree panel

use eframe::egui::{self, Align2, FontId, Key, RichText, Sense, TextEdit, Ui};

use crate::core::tree::{RenameEdit, TreeNode, TreeViewState};
use crate::core::workspace::Workspace;

const ROW_HEIGHT: f32 = 22.0;
const INDENT: f32 = 14.0;

/// Something a row asked for; applied after the tree is drawn
#[derive(Debug, Clone, PartialEq, Eq)]
enum TreeAction {
    Toggle(String),
    Open(String),
    Create { parent: Option<String>, is_folder: bool },
    BeginRename(String),
    CommitRename,
    CancelRename,
    Delete(String),
    ToggleAll,
    DragStart(String),
    DragEnd,
}

struct RowContext<'a> {
    view: &'a TreeViewState,
    edit: &'a mut Option<RenameEdit>,
    active_file: Option<&'a str>,
    focus_edit: bool,
    hovered_folder: Option<String>,
    actions: Vec<TreeAction>,
}

/// File tree panel
#[derive(Default)]
pub struct FileTreePanel {
    /// Rename field that already received focus
    focused_edit: Option<String>,
}

impl FileTreePanel {
    pub fn show(&mut self, ui: &mut Ui, ws: &mut Workspace) {
        let mut actions = Vec::new();

        ui.horizontal(|ui| {
            ui.label(RichText::new("My Library").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("\u{2195}").on_hover_text("Expand / collapse all").clicked() {
                    actions.push(TreeAction::ToggleAll);
                }
                if ui.small_button("\u{1F4C1}").on_hover_text("New folder").clicked() {
                    actions.push(TreeAction::Create { parent: None, is_folder: true });
                }
                if ui.small_button("\u{1F4C4}").on_hover_text("New file").clicked() {
                    actions.push(TreeAction::Create { parent: None, is_folder: false });
                }
            });
        });
        ui.separator();

        let mut edit = ws.view().editing().cloned();
        let focus_edit = edit.as_ref().map(|e| &e.id) != self.focused_edit.as_ref();
        let active_file = ws.tabs().active().and_then(|t| t.file_id().map(str::to_string));

        let mut rows = RowContext {
            view: ws.view(),
            edit: &mut edit,
            active_file: active_file.as_deref(),
            focus_edit,
            hovered_folder: None,
            actions: Vec::new(),
        };

        egui::ScrollArea::vertical()
            .id_salt("file_tree_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = 0.0;
                for node in ws.tree().roots() {
                    Self::show_node(ui, node, 0, &mut rows);
                }
            });

        let hovered_folder = rows.hovered_folder.take();
        actions.extend(rows.actions);
        self.focused_edit = edit.as_ref().map(|e| e.id.clone());

        // Keep what was typed this frame
        if let (Some(typed), Some(current)) = (edit, ws.view_mut().editing_mut()) {
            if typed.id == current.id {
                current.buffer = typed.buffer;
            }
        }

        if ws.view().drag().is_some() {
            ws.drag_over(hovered_folder.as_deref());
            if let Some(pos) = ui.ctx().pointer_latest_pos() {
                ws.view_mut().track_pointer((pos.x, pos.y));
            }
            if ui.input(|i| i.pointer.any_released()) && !actions.contains(&TreeAction::DragEnd) {
                actions.push(TreeAction::DragEnd);
            }
            Self::show_drag_hint(ui.ctx(), ws);
        }

        for action in actions {
            Self::apply(ws, action);
        }
    }

    fn show_node(ui: &mut Ui, node: &TreeNode, depth: usize, rows: &mut RowContext<'_>) {
        if rows.view.is_editing(&node.id) {
            Self::show_rename_row(ui, node, depth, rows);
        } else {
            Self::show_row(ui, node, depth, rows);
        }

        if node.is_folder && rows.view.is_expanded(&node.id) {
            for child in &node.children {
                Self::show_node(ui, child, depth + 1, rows);
            }
        }
    }

    fn icon(node: &TreeNode, expanded: bool) -> &'static str {
        match (node.is_folder, expanded) {
            (true, true) => "\u{1F4C2}",
            (true, false) => "\u{1F4C1}",
            (false, _) => "\u{1F4DD}",
        }
    }

    fn show_row(ui: &mut Ui, node: &TreeNode, depth: usize, rows: &mut RowContext<'_>) {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(ui.available_width(), ROW_HEIGHT), Sense::click_and_drag());
        let expanded = rows.view.is_expanded(&node.id);
        let drag = rows.view.drag();
        let is_drop_target = drag.is_some_and(|d| d.over_id.as_deref() == Some(node.id.as_str()));
        let is_dragged = rows.view.is_dragging(&node.id);
        let is_active = rows.active_file == Some(node.id.as_str());

        if ui.is_rect_visible(rect) {
            let visuals = ui.visuals();
            let fill = if is_drop_target {
                Some(visuals.selection.bg_fill)
            } else if is_active {
                Some(visuals.widgets.active.weak_bg_fill)
            } else if response.hovered() && drag.is_none() {
                Some(visuals.widgets.hovered.weak_bg_fill)
            } else {
                None
            };
            if let Some(fill) = fill {
                ui.painter().rect_filled(rect, 3.0, fill);
            }

            let arrow = match (node.is_folder, expanded) {
                (true, true) => "\u{25BE}",
                (true, false) => "\u{25B8}",
                (false, _) => " ",
            };
            let mut color = visuals.text_color();
            if is_dragged {
                color = color.gamma_multiply(0.5);
            }
            ui.painter().text(
                rect.left_center() + egui::vec2(6.0 + depth as f32 * INDENT, 0.0),
                Align2::LEFT_CENTER,
                format!("{} {} {}", arrow, Self::icon(node, expanded), node.name),
                FontId::proportional(13.0),
                color,
            );
        }

        if drag.is_some() && node.is_folder && response.contains_pointer() {
            rows.hovered_folder = Some(node.id.clone());
        }

        if response.drag_started() {
            rows.actions.push(TreeAction::DragStart(node.id.clone()));
        } else if response.drag_stopped() {
            rows.actions.push(TreeAction::DragEnd);
        } else if response.double_clicked() {
            rows.actions.push(TreeAction::BeginRename(node.id.clone()));
        } else if response.clicked() {
            rows.actions.push(if node.is_folder {
                TreeAction::Toggle(node.id.clone())
            } else {
                TreeAction::Open(node.id.clone())
            });
        }

        response.context_menu(|ui| {
            if node.is_folder {
                if ui.button("New file").clicked() {
                    rows.actions.push(TreeAction::Create {
                        parent: Some(node.id.clone()),
                        is_folder: false,
                    });
                    ui.close();
                }
                if ui.button("New folder").clicked() {
                    rows.actions.push(TreeAction::Create {
                        parent: Some(node.id.clone()),
                        is_folder: true,
                    });
                    ui.close();
                }
                ui.separator();
            }
            if ui.button("Rename").clicked() {
                rows.actions.push(TreeAction::BeginRename(node.id.clone()));
                ui.close();
            }
            if ui.button("Delete").clicked() {
                rows.actions.push(TreeAction::Delete(node.id.clone()));
                ui.close();
            }
        });
    }

    fn show_rename_row(ui: &mut Ui, node: &TreeNode, depth: usize, rows: &mut RowContext<'_>) {
        let Some(edit) = rows.edit.as_mut() else {
            return;
        };
        ui.horizontal(|ui| {
            ui.add_space(6.0 + depth as f32 * INDENT);
            ui.label(Self::icon(node, rows.view.is_expanded(&node.id)));
            let response = ui.add(TextEdit::singleline(&mut edit.buffer).desired_width(f32::INFINITY));
            if rows.focus_edit {
                response.request_focus();
            }
            if ui.input(|i| i.key_pressed(Key::Escape)) {
                rows.actions.push(TreeAction::CancelRename);
            } else if response.lost_focus() {
                rows.actions.push(TreeAction::CommitRename);
            }
        });
    }

    /// Floating "Move to" label next to the pointer
    fn show_drag_hint(ctx: &egui::Context, ws: &Workspace) {
        let Some(drag) = ws.view().drag() else {
            return;
        };
        let (Some(target), Some((x, y))) = (drag.over_id.as_deref(), drag.pointer) else {
            return;
        };
        let Some(folder) = ws.tree().find_by_id(target) else {
            return;
        };

        egui::Area::new(egui::Id::new("tree_drag_hint"))
            .order(egui::Order::Tooltip)
            .fixed_pos(egui::pos2(x + 10.0, y + 10.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(format!("\u{1F4C4} Move to '{}'", folder.name));
                });
            });
    }

    fn apply(ws: &mut Workspace, action: TreeAction) {
        match action {
            TreeAction::Toggle(id) => ws.view_mut().toggle(&id),
            TreeAction::Open(id) => ws.open_file(&id),
            TreeAction::Create { parent, is_folder } => {
                ws.create_node(parent.as_deref(), is_folder);
            }
            TreeAction::BeginRename(id) => ws.begin_rename(&id),
            TreeAction::CommitRename => ws.commit_rename(),
            TreeAction::CancelRename => ws.cancel_rename(),
            TreeAction::Delete(id) => ws.delete_node(&id),
            TreeAction::ToggleAll => ws.toggle_all(),
            TreeAction::DragStart(id) => {
                ws.begin_drag(&id);
            }
            TreeAction::DragEnd => {
                ws.finish_drag();
            }
        }
    }
}
