//! Control Panel Widget
//! Left side panel with the data source and load status.

use crate::config::Palette;
use egui::{Color32, RichText};
use std::path::{Path, PathBuf};

/// Left side control panel with data directory selection and reload.
pub struct ControlPanel {
    pub data_dir: PathBuf,
    pub progress: f32,
    pub status: String,
}

impl ControlPanel {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            progress: 0.0,
            status: "Ready".to_string(),
        }
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        palette: &Palette,
        is_loading: bool,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚦 Accident Dashboard")
                    .size(20.0)
                    .color(palette.primary()),
            );
            ui.label(
                RichText::new("Land traffic accidents in urban and suburban areas")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let dir_text = self
                        .data_dir
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| self.data_dir.display().to_string());

                    ui.label(RichText::new(&dir_text).size(12.0))
                        .on_hover_text(self.data_dir.display().to_string());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!is_loading, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseDataDir;
                            }
                        });
                    });
                });
            });

        ui.add_space(10.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!is_loading, |ui| {
                let button = egui::Button::new(RichText::new("🔄 Reload Data").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Reload;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(is_loading),
        );

        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseDataDir,
    Reload,
}
