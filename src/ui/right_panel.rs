//! Right-hand panel switching between the outline and the AI chat

use eframe::egui::Ui;

use super::chat::ChatPanel;
use super::live_preview::RenderedDocument;
use super::outline::OutlinePanel;
use crate::core::workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RightPanelMode {
    #[default]
    Outline,
    Chat,
}

#[derive(Default)]
pub struct RightPanel {
    pub mode: RightPanelMode,
    chat: ChatPanel,
}

impl RightPanel {
    pub fn show(&mut self, ui: &mut Ui, ws: &mut Workspace, view: &mut RenderedDocument) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.mode, RightPanelMode::Outline, "Outline");
            ui.selectable_value(&mut self.mode, RightPanelMode::Chat, "AI");
        });
        ui.separator();

        match self.mode {
            RightPanelMode::Outline => OutlinePanel::show(ui, ws.outline_mut(), view),
            RightPanelMode::Chat => self.chat.show(ui, ws.chat_mut()),
        }
    }
}
