//! Bottom status bar

use eframe::egui::{self, RichText, Ui};

/// Draws the bar; returns true when settings was clicked
pub fn show(ui: &mut Ui, word_count: Option<usize>) -> bool {
    let mut open_settings = false;
    ui.horizontal(|ui| {
        ui.label(RichText::new("AI learning").small());
        if let Some(words) = word_count {
            ui.separator();
            ui.label(RichText::new(format!("{} words", words)).small());
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("\u{2699} Settings").clicked() {
                open_settings = true;
            }
        });
    });
    open_settings
}
