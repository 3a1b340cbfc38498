//! AI chat panel

use chrono::Local;
use eframe::egui::{self, Key, RichText, Ui};
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};

use crate::core::chat::{format_time_ago, ChatMode, ChatSession, Composer, Model, Role};

const TAB_TITLE_CHARS: usize = 20;

/// Shorten a conversation title for the tab row
pub fn tab_title(title: &str) -> String {
    if title.chars().count() > TAB_TITLE_CHARS {
        let short: String = title.chars().take(TAB_TITLE_CHARS).collect();
        format!("{short}...")
    } else {
        title.to_string()
    }
}

enum ChatAction {
    Activate(String),
    New,
    Delete(String),
}

/// Chat panel state that is not part of the session
#[derive(Default)]
pub struct ChatPanel {
    input: String,
    history_open: bool,
    cache: CommonMarkCache,
}

impl ChatPanel {
    pub fn show(&mut self, ui: &mut Ui, chat: &mut ChatSession) {
        let mut action = None;

        ui.horizontal(|ui| {
            let active_id = chat.active_id().map(str::to_string);
            for conversation in chat.recent(2) {
                let selected = active_id.as_deref() == Some(conversation.id.as_str());
                if ui
                    .selectable_label(selected, tab_title(&conversation.title))
                    .on_hover_text(&conversation.title)
                    .clicked()
                {
                    action = Some(ChatAction::Activate(conversation.id.clone()));
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("\u{1F552}").on_hover_text("History").clicked() {
                    self.history_open = !self.history_open;
                }
                if ui.small_button("+").on_hover_text("New chat").clicked() {
                    action = Some(ChatAction::New);
                }
            });
        });
        ui.separator();

        if self.history_open {
            self.show_history(ui, chat, &mut action);
            ui.separator();
        }

        match action.take() {
            Some(ChatAction::Activate(id)) => chat.set_active(&id),
            Some(ChatAction::New) => {
                chat.new_conversation();
            }
            Some(ChatAction::Delete(id)) => chat.delete_conversation(&id),
            None => {}
        }

        egui::TopBottomPanel::bottom("chat_composer")
            .frame(egui::Frame::new().inner_margin(egui::Margin::symmetric(0, 6)))
            .show_inside(ui, |ui| self.show_composer(ui, chat));

        self.show_messages(ui, chat);
    }

    fn show_history(&self, ui: &mut Ui, chat: &ChatSession, action: &mut Option<ChatAction>) {
        egui::CollapsingHeader::new("Past Chats")
            .default_open(true)
            .show(ui, |ui| {
                let now = Local::now();
                for conversation in chat.conversations() {
                    ui.horizontal(|ui| {
                        let selected = chat.active_id() == Some(conversation.id.as_str());
                        if ui.selectable_label(selected, &conversation.title).clicked() {
                            *action = Some(ChatAction::Activate(conversation.id.clone()));
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("\u{1F5D1}").on_hover_text("Delete").clicked() {
                                *action = Some(ChatAction::Delete(conversation.id.clone()));
                            }
                            ui.label(RichText::new(format_time_ago(conversation.updated_at, now)).weak());
                        });
                    });
                }
            });
    }

    fn show_messages(&mut self, ui: &mut Ui, chat: &ChatSession) {
        let Some(conversation) = chat.active() else {
            ui.label(RichText::new("No conversation selected").weak());
            return;
        };

        egui::ScrollArea::vertical()
            .id_salt("chat_messages")
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if conversation.messages.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(30.0);
                        ui.label(RichText::new("Ask anything about your notes").weak());
                    });
                }

                for message in &conversation.messages {
                    match message.role {
                        Role::User => {
                            ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                                egui::Frame::new()
                                    .fill(ui.visuals().selection.bg_fill.gamma_multiply(0.4))
                                    .inner_margin(egui::Margin::same(8))
                                    .corner_radius(6)
                                    .show(ui, |ui| {
                                        ui.label(&message.content);
                                    });
                            });
                        }
                        Role::Assistant => {
                            egui::Frame::new()
                                .fill(ui.visuals().faint_bg_color)
                                .inner_margin(egui::Margin::same(8))
                                .corner_radius(6)
                                .show(ui, |ui| {
                                    ui.push_id(&message.id, |ui| {
                                        CommonMarkViewer::new().show(ui, &mut self.cache, &message.content);
                                    });
                                });
                        }
                    }
                    ui.add_space(6.0);
                }

                if chat.awaiting_reply_for() == Some(conversation.id.as_str()) {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Thinking...").weak());
                    });
                }
            });
    }

    fn show_composer(&mut self, ui: &mut Ui, chat: &mut ChatSession) {
        let input_id = ui.make_persistent_id("chat_input");
        let enter_pressed = ui.memory(|m| m.has_focus(input_id))
            && ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, Key::Enter));

        ui.add(
            egui::TextEdit::multiline(&mut self.input)
                .id(input_id)
                .hint_text("Plan, search, build anything")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        let mut send = enter_pressed;
        ui.horizontal(|ui| {
            let mut mode = chat.mode();
            egui::ComboBox::from_id_salt("chat_mode")
                .selected_text(mode.label())
                .width(70.0)
                .show_ui(ui, |ui| {
                    for option in ChatMode::ALL {
                        ui.selectable_value(&mut mode, option, option.label());
                    }
                });
            if mode != chat.mode() {
                chat.set_mode(mode);
            }

            let mut composer = chat.composer();
            egui::ComboBox::from_id_salt("chat_composer")
                .selected_text(composer.label())
                .width(90.0)
                .show_ui(ui, |ui| {
                    for option in Composer::ALL {
                        ui.selectable_value(&mut composer, option, option.label());
                    }
                });
            if composer != chat.composer() {
                chat.set_composer(composer);
            }

            let mut model = chat.model();
            egui::ComboBox::from_id_salt("chat_model")
                .selected_text(model.label())
                .width(110.0)
                .show_ui(ui, |ui| {
                    for option in Model::ALL {
                        ui.selectable_value(&mut model, option, option.label());
                    }
                });
            if model != chat.model() {
                chat.set_model(model);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let can_send = !self.input.trim().is_empty() && !chat.is_awaiting_reply();
                if ui.add_enabled(can_send, egui::Button::new("\u{2191}")).on_hover_text("Send").clicked() {
                    send = true;
                }
            });
        });

        if send {
            let conversation_id = match chat.active_id() {
                Some(id) => id.to_string(),
                None => chat.new_conversation(),
            };
            if chat.send_message(&conversation_id, &self.input) {
                self.input.clear();
            }
        }
    }
}
