//! Narrow icon rail on the far left

use eframe::egui::{self, RichText, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Explorer,
    Search,
    SourceControl,
    Run,
    Extensions,
}

impl Activity {
    const ALL: [Activity; 5] = [
        Activity::Explorer,
        Activity::Search,
        Activity::SourceControl,
        Activity::Run,
        Activity::Extensions,
    ];

    fn icon(self) -> &'static str {
        match self {
            Activity::Explorer => "\u{1F4C1}",
            Activity::Search => "\u{1F50D}",
            Activity::SourceControl => "\u{2387}",
            Activity::Run => "\u{25B6}",
            Activity::Extensions => "\u{1F9E9}",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Activity::Explorer => "Explorer (Ctrl+B)",
            Activity::Search => "Search",
            Activity::SourceControl => "Source Control",
            Activity::Run => "Run and Debug",
            Activity::Extensions => "Extensions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    ToggleSidebar,
    OpenSettings,
}

pub struct ActivityBar;

impl ActivityBar {
    /// Draw the rail; only explorer and settings do anything beyond selection
    pub fn show(ui: &mut Ui, active: &mut Activity) -> Option<ActivityAction> {
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.add_space(6.0);
            for activity in Activity::ALL {
                let icon = RichText::new(activity.icon()).size(18.0);
                if ui
                    .selectable_label(*active == activity, icon)
                    .on_hover_text(activity.label())
                    .clicked()
                {
                    if activity == Activity::Explorer {
                        action = Some(ActivityAction::ToggleSidebar);
                    }
                    *active = activity;
                }
                ui.add_space(4.0);
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                ui.add_space(6.0);
                if ui
                    .button(RichText::new("\u{2699}").size(18.0))
                    .on_hover_text("Settings")
                    .clicked()
                {
                    action = Some(ActivityAction::OpenSettings);
                }
            });
        });

        action
    }
}
