//! Dashboard Main Application
//! Main window with the data-source panel, headline metrics and tabs.

use crate::config::DashboardConfig;
use crate::data::{AccidentTables, DataLoader, LoaderError};
use crate::error::DashboardError;
use crate::gui::{ControlPanel, ControlPanelAction, TabContent, TabViewer};
use crate::stats::{HeadlineMetrics, StatsCalculator};
use egui::{Color32, RichText, SidePanel};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info};

/// Loading result from background thread
enum LoadResult {
    Progress(f32, String),
    Complete(Box<AccidentTables>, f32),
    Error(LoaderError),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    tab_viewer: TabViewer,

    tables: Option<AccidentTables>,
    load_failure: Option<DashboardError>,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(&config.data_dir),
            config,
            tab_viewer: TabViewer::new(),
            tables: None,
            load_failure: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_load();
        app
    }

    /// Read every source on a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        self.is_loading = true;
        self.control_panel.set_progress(5.0, "Loading data...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let config = self.config.clone();

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(
                20.0,
                "Reading spreadsheets...".to_string(),
            ));
            let started = Instant::now();

            match DataLoader::load_all(&config) {
                Ok(tables) => {
                    let elapsed = started.elapsed().as_secs_f32();
                    let _ = tx.send(LoadResult::Complete(Box::new(tables), elapsed));
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e));
                }
            }
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        // Take the receiver temporarily to avoid borrow issues
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;
            let (results, disconnected) = drain_load_results(&rx);

            for result in results {
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    LoadResult::Complete(tables, elapsed) => {
                        self.accept_tables(*tables, elapsed);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(e) => {
                        error!(error = %e, "loading failed");
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", e));
                        self.tables = None;
                        self.load_failure = Some(e.into());
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            // Worker gone without a final message
            if should_keep_receiver && disconnected {
                error!("loading thread stopped before finishing");
                let failure = DashboardError::LoadInterrupted;
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", failure));
                self.tables = None;
                self.load_failure = Some(failure);
                self.is_loading = false;
                should_keep_receiver = false;
            }

            // Put receiver back if still needed
            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn accept_tables(&mut self, tables: AccidentTables, elapsed: f32) {
        match tables.latest_year() {
            Ok(latest) => {
                self.tab_viewer.reset(&tables, &latest);
                self.control_panel.set_progress(
                    100.0,
                    &format!(
                        "Loaded 5 sources, latest year {} ({:.1}s)",
                        latest, elapsed
                    ),
                );
                info!(latest_year = %latest, "dashboard ready");
                self.tables = Some(tables);
                self.load_failure = None;
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
                self.tables = None;
                self.load_failure = Some(e.into());
            }
        }
    }

    fn handle_browse_data_dir(&mut self) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.config.data_dir)
            .pick_folder()
        {
            info!(data_dir = %dir.display(), "data directory changed");
            self.control_panel.data_dir = dir.clone();
            self.config.data_dir = dir;
            self.start_load();
        }
    }

    /// Compute the headline metrics and active tab; nothing is drawn on failure.
    fn build_frame(&self) -> Result<Option<(HeadlineMetrics, TabContent)>, DashboardError> {
        let Some(tables) = &self.tables else {
            return Ok(None);
        };
        let metrics = HeadlineMetrics::extract(tables, &self.config.schema)?;
        let content = self.tab_viewer.build(tables, &self.config)?;
        Ok(Some((metrics, content)))
    }

    fn show_metrics(ui: &mut egui::Ui, metrics: &HeadlineMetrics) {
        ui.columns(4, |cols| {
            for (col, (caption, value)) in cols.iter_mut().zip(metrics.cards()) {
                egui::Frame::none()
                    .fill(col.visuals().widgets.noninteractive.bg_fill)
                    .rounding(8.0)
                    .inner_margin(10.0)
                    .show(col, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(caption).size(12.0).color(Color32::GRAY));
                        ui.label(
                            RichText::new(StatsCalculator::format_count(value))
                                .size(24.0)
                                .strong(),
                        );
                    });
            }
        });
    }

    fn show_failure(ui: &mut egui::Ui, failure: &DashboardError) {
        egui::Frame::none()
            .fill(Color32::from_rgb(248, 215, 218))
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new(failure.headline())
                        .size(14.0)
                        .color(Color32::from_rgb(114, 28, 36)),
                );
            });
        ui.add_space(5.0);
        ui.label(RichText::new(format!("ℹ {}", DashboardError::HINT)).color(Color32::GRAY));
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                let action = self
                    .control_panel
                    .show(ui, &self.config.palette, self.is_loading);

                match action {
                    ControlPanelAction::BrowseDataDir => self.handle_browse_data_dir(),
                    ControlPanelAction::Reload => self.start_load(),
                    ControlPanelAction::None => {}
                }
            });

        // Central panel - metrics and tabs
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(
                RichText::new("Traffic Accident Statistics")
                    .size(24.0)
                    .strong()
                    .color(self.config.palette.primary()),
            );
            ui.add_space(8.0);

            if self.is_loading {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }

            if let Some(failure) = &self.load_failure {
                Self::show_failure(ui, failure);
                return;
            }

            let frame = match self.build_frame() {
                Ok(Some(frame)) => Ok(frame),
                Ok(None) => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No Data").size(20.0));
                    });
                    return;
                }
                Err(e) => {
                    debug!(error = %e, "dashboard frame aborted");
                    Err(e)
                }
            };

            match &frame {
                Ok((metrics, _)) => Self::show_metrics(ui, metrics),
                Err(e) => Self::show_failure(ui, e),
            }
            ui.add_space(10.0);

            // Tabs and selectors stay usable so a bad selection can be changed
            self.tab_viewer.show_tabs(ui);
            ui.separator();
            self.tab_viewer.show_selectors(ui);

            if let Ok((_, content)) = &frame {
                self.tab_viewer.show(ui, content, &self.config);
            }
        });
    }
}

/// Drain pending messages. The flag is set once the worker has hung up.
fn drain_load_results(rx: &Receiver<LoadResult>) -> (Vec<LoadResult>, bool) {
    let mut results = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(result) => results.push(result),
            Err(TryRecvError::Empty) => return (results, false),
            Err(TryRecvError::Disconnected) => return (results, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_worker_is_not_reported_as_stopped() {
        let (tx, rx) = channel();
        tx.send(LoadResult::Progress(20.0, "Reading".to_string()))
            .unwrap();

        let (results, disconnected) = drain_load_results(&rx);
        assert_eq!(results.len(), 1);
        assert!(!disconnected);
        drop(tx);
    }

    #[test]
    fn dropped_worker_is_detected_after_draining() {
        let (tx, rx) = channel();
        let worker = thread::spawn(move || {
            tx.send(LoadResult::Progress(20.0, "Reading".to_string()))
                .unwrap();
            panic!("worker died");
        });
        assert!(worker.join().is_err());

        let (results, disconnected) = drain_load_results(&rx);
        assert!(matches!(results.as_slice(), [LoadResult::Progress(..)]));
        assert!(disconnected);
    }
}
