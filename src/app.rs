//! Main application state and UI coordination

use std::time::Duration;

use eframe::egui;
use tokio::runtime::Runtime;

use crate::core::{config::AppConfig, workspace::Workspace};
use crate::ui::{
    activity_bar::{Activity, ActivityAction, ActivityBar},
    editor::EditorPanel,
    file_tree::FileTreePanel,
    live_preview::RenderedDocument,
    right_panel::RightPanel,
    settings::SettingsWindow,
    status_bar,
};

/// Repaint interval while a chat reply is pending
const PENDING_REPLY_REPAINT: Duration = Duration::from_millis(100);

/// Main application state
pub struct InkdeskApp {
    /// All document, tab, outline and chat state
    workspace: Workspace,
    /// Application configuration
    config: AppConfig,
    activity: Activity,
    file_tree: FileTreePanel,
    editor: EditorPanel,
    right_panel: RightPanel,
    settings: SettingsWindow,
    /// Heading positions of the document on screen
    rendered: RenderedDocument,
    /// Tab the rendered positions belong to
    rendered_tab: String,
    /// Whether sidebar is visible
    sidebar_visible: bool,
    /// Whether the outline / chat panel is visible
    right_panel_visible: bool,
    /// Runs reply timers; dropped after the workspace
    _runtime: Runtime,
}

impl InkdeskApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Runtime) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {}", e);
            AppConfig::default()
        });
        Self::apply_theme(&cc.egui_ctx, &config);

        let workspace = Workspace::new(runtime.handle().clone(), &config);
        let rendered_tab = workspace.tabs().active_id().to_string();

        Self {
            workspace,
            activity: Activity::default(),
            file_tree: FileTreePanel::default(),
            editor: EditorPanel::default(),
            right_panel: RightPanel::default(),
            settings: SettingsWindow::default(),
            rendered: RenderedDocument::default(),
            rendered_tab,
            sidebar_visible: true,
            right_panel_visible: config.ui.right_panel_visible,
            config,
            _runtime: runtime,
        }
    }

    fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
        let visuals = if config.ui.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);
    }

    /// Handle keyboard shortcuts
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let shortcut = |key| egui::KeyboardShortcut::new(egui::Modifiers::CTRL, key);
        let (new_file, new_tab, close_tab, sidebar, right_panel) = ctx.input_mut(|i| {
            (
                i.consume_shortcut(&shortcut(egui::Key::N)),
                i.consume_shortcut(&shortcut(egui::Key::T)),
                i.consume_shortcut(&shortcut(egui::Key::W)),
                i.consume_shortcut(&shortcut(egui::Key::B)),
                i.consume_shortcut(&shortcut(egui::Key::J)),
            )
        });

        if new_file {
            self.sidebar_visible = true;
            self.workspace.create_node(None, false);
        }
        if new_tab {
            self.workspace.new_tab();
        }
        if close_tab {
            let active = self.workspace.tabs().active_id().to_string();
            self.workspace.close_tab(&active);
        }
        if sidebar {
            self.sidebar_visible = !self.sidebar_visible;
        }
        if right_panel {
            self.right_panel_visible = !self.right_panel_visible;
        }
    }
}

impl eframe::App for InkdeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.workspace.chat_mut().poll_replies() > 0 {
            tracing::debug!("Applied simulated reply");
        }
        if self.workspace.chat().is_awaiting_reply() {
            ctx.request_repaint_after(PENDING_REPLY_REPAINT);
        }

        self.handle_shortcuts(ctx);

        if self.workspace.tabs().active_id() != self.rendered_tab {
            self.rendered.reset();
            self.rendered_tab = self.workspace.tabs().active_id().to_string();
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let word_count = self
                .workspace
                .tabs()
                .active()
                .filter(|tab| !tab.is_placeholder())
                .map(|_| self.workspace.active_word_count());
            if status_bar::show(ui, word_count) {
                self.settings.open = true;
            }
        });

        egui::SidePanel::left("activity_bar")
            .resizable(false)
            .exact_width(44.0)
            .show(ctx, |ui| match ActivityBar::show(ui, &mut self.activity) {
                Some(ActivityAction::ToggleSidebar) => self.sidebar_visible = !self.sidebar_visible,
                Some(ActivityAction::OpenSettings) => self.settings.open = true,
                None => {}
            });

        if self.sidebar_visible {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(self.config.ui.sidebar_width)
                .min_width(150.0)
                .show(ctx, |ui| {
                    self.file_tree.show(ui, &mut self.workspace);
                });
        }

        if self.right_panel_visible {
            egui::SidePanel::right("right_panel")
                .resizable(true)
                .default_width(self.config.ui.right_panel_width)
                .min_width(220.0)
                .show(ctx, |ui| {
                    self.right_panel.show(ui, &mut self.workspace, &mut self.rendered);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.editor
                .show(ui, &mut self.workspace, &mut self.rendered, &self.config.editor);
        });

        if self.settings.show(ctx, &mut self.config) {
            Self::apply_theme(ctx, &self.config);
        }
    }
}
