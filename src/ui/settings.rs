//! Settings window

use eframe::egui::{self, RichText};

use crate::core::chat::{ChatMode, Composer, Model};
use crate::core::config::AppConfig;

#[derive(Default)]
pub struct SettingsWindow {
    pub open: bool,
    status: Option<String>,
}

impl SettingsWindow {
    /// Edit `config` in place. Returns true when the theme changed.
    pub fn show(&mut self, ctx: &egui::Context, config: &mut AppConfig) -> bool {
        let mut theme_changed = false;
        let mut open = self.open;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Theme");
                        ui.horizontal(|ui| {
                            for theme in ["dark", "light"] {
                                if ui
                                    .selectable_label(config.ui.theme == theme, theme)
                                    .clicked()
                                    && config.ui.theme != theme
                                {
                                    config.ui.theme = theme.to_string();
                                    theme_changed = true;
                                }
                            }
                        });
                        ui.end_row();

                        ui.label("Font size");
                        ui.add(egui::Slider::new(&mut config.editor.font_size, 10.0..=24.0));
                        ui.end_row();

                        ui.label("Formatting toolbar");
                        ui.checkbox(&mut config.editor.show_toolbar, "");
                        ui.end_row();

                        ui.label("Reply delay (ms)");
                        ui.add(egui::DragValue::new(&mut config.chat.reply_delay_ms).range(0..=10_000));
                        ui.end_row();

                        ui.label("Default mode");
                        egui::ComboBox::from_id_salt("settings_mode")
                            .selected_text(config.chat.default_mode.label())
                            .show_ui(ui, |ui| {
                                for mode in ChatMode::ALL {
                                    ui.selectable_value(&mut config.chat.default_mode, mode, mode.label());
                                }
                            });
                        ui.end_row();

                        ui.label("Default composer");
                        egui::ComboBox::from_id_salt("settings_composer")
                            .selected_text(config.chat.default_composer.label())
                            .show_ui(ui, |ui| {
                                for composer in Composer::ALL {
                                    ui.selectable_value(&mut config.chat.default_composer, composer, composer.label());
                                }
                            });
                        ui.end_row();

                        ui.label("Default model");
                        egui::ComboBox::from_id_salt("settings_model")
                            .selected_text(config.chat.default_model.label())
                            .show_ui(ui, |ui| {
                                for model in Model::ALL {
                                    ui.selectable_value(&mut config.chat.default_model, model, model.label());
                                }
                            });
                        ui.end_row();
                    });

                ui.add_space(6.0);
                ui.label(RichText::new("Chat settings apply to new sessions.").weak().small());
                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        self.status = Some(match config.save() {
                            Ok(()) => "Saved".to_string(),
                            Err(e) => {
                                tracing::error!("Failed to save config: {}", e);
                                format!("Save failed: {e}")
                            }
                        });
                    }
                    if ui.button("Reset to defaults").clicked() {
                        *config = AppConfig::default();
                        theme_changed = true;
                        self.status = None;
                    }
                    if let Some(status) = &self.status {
                        ui.label(RichText::new(status).weak());
                    }
                });
            });

        self.open = open;
        theme_changed
    }
}
