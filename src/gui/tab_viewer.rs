//! Tab Viewer Widget
//! Tab bar, per-tab selectors and the charts of the active tab.

use crate::charts::{ChartData, ChartPlotter};
use crate::config::DashboardConfig;
use crate::data::{AccidentTables, DataProcessor};
use crate::error::DashboardError;
use crate::stats::StatsCalculator;
use crate::views::{self, CausesView, Panel, StateView, GLOSSARY};
use egui::{Color32, ComboBox, RichText, ScrollArea};

/// Dashboard tabs in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    ByState,
    Causes,
    Phrases,
    Glossary,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::ByState,
        Tab::Causes,
        Tab::Phrases,
        Tab::Glossary,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "📈 National Overview",
            Tab::ByState => "🗺 By State",
            Tab::Causes => "🔍 Causes",
            Tab::Phrases => "💡 Sales Phrases",
            Tab::Glossary => "📘 Glossary",
        }
    }
}

/// Everything the active tab draws, computed before anything is shown.
pub enum TabContent {
    Overview {
        trend: Panel<ChartData>,
        cross_tab: Panel<ChartData>,
    },
    ByState(Panel<StateView>),
    Causes {
        causes: CausesView,
        variation: ChartData,
    },
    Phrases(Panel<Vec<String>>),
    Glossary,
}

/// Active tab plus the user's selections.
pub struct TabViewer {
    pub tab: Tab,
    years: Vec<String>,
    /// Years present in every table the per-state view reads
    state_years: Vec<String>,
    latest_year: String,
    /// Selected trend years, in the order they were picked
    pub trend_years: Vec<String>,
    pub state_year: String,
    pub state_entity: Option<String>,
    pub causes_year: String,
}

impl Default for TabViewer {
    fn default() -> Self {
        Self {
            tab: Tab::Overview,
            years: Vec::new(),
            state_years: Vec::new(),
            latest_year: String::new(),
            trend_years: Vec::new(),
            state_year: String::new(),
            state_entity: None,
            causes_year: String::new(),
        }
    }
}

impl TabViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset selections after a (re)load: every year for the trend, latest year elsewhere.
    pub fn reset(&mut self, tables: &AccidentTables, latest_year: &str) {
        self.years = tables.years().to_vec();
        self.state_years = tables.state_years();
        self.latest_year = latest_year.to_string();
        self.trend_years = self.years.clone();
        self.state_year = self
            .state_years
            .iter()
            .max()
            .cloned()
            .unwrap_or_else(|| latest_year.to_string());
        self.state_entity = None;
        self.causes_year = latest_year.to_string();
    }

    /// Compute the active tab. Any error aborts the whole frame.
    pub fn build(
        &self,
        tables: &AccidentTables,
        config: &DashboardConfig,
    ) -> Result<TabContent, DashboardError> {
        let schema = &config.schema;
        let palette = &config.palette;
        let categories = &config.vehicle_categories;

        Ok(match self.tab {
            Tab::Overview => {
                let trend = views::trend_chart(tables, &self.trend_years, schema, palette)?;
                let cross =
                    DataProcessor::cross_tab(tables, &self.latest_year, schema, categories)?;
                let cross_tab = views::cross_tab_chart(
                    &cross,
                    &self.latest_year,
                    schema,
                    categories,
                    palette,
                )?;
                TabContent::Overview { trend, cross_tab }
            }
            Tab::ByState => TabContent::ByState(views::state_view(
                tables,
                &self.state_year,
                self.state_entity.as_deref(),
                schema,
                palette,
                config.top_n,
            )?),
            Tab::Causes => {
                let causes = views::causes_view(tables, &self.causes_year, schema, palette)?;
                let variation =
                    views::variation_chart(&views::variation_long(tables, schema)?, palette);
                TabContent::Causes { causes, variation }
            }
            Tab::Phrases => {
                let cross =
                    DataProcessor::cross_tab(tables, &self.latest_year, schema, categories)?;
                TabContent::Phrases(views::sales_phrases(&cross, schema, categories)?)
            }
            Tab::Glossary => TabContent::Glossary,
        })
    }

    /// Draw the tab bar.
    pub fn show_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.tab, tab, RichText::new(tab.title()).size(14.0));
            }
        });
    }

    /// Draw the heading and selectors of the active tab.
    ///
    /// Needs no computed content, so selections stay editable after a failed frame.
    pub fn show_selectors(&mut self, ui: &mut egui::Ui) {
        let heading = match self.tab {
            Tab::Overview => "Accidents Over Time",
            Tab::ByState => "Analysis by State",
            Tab::Causes => "Accident Causes",
            Tab::Phrases => "Sales Phrases",
            Tab::Glossary => "Glossary",
        };
        ui.label(RichText::new(heading).size(18.0).strong());
        ui.add_space(5.0);

        match self.tab {
            Tab::Overview => self.trend_selector(ui),
            Tab::ByState => Self::year_selector(
                ui,
                "state_year",
                "Year:",
                &self.state_years,
                &mut self.state_year,
            ),
            Tab::Causes => Self::year_selector(
                ui,
                "causes_year",
                "Year to analyse:",
                &self.years,
                &mut self.causes_year,
            ),
            Tab::Phrases | Tab::Glossary => {}
        }
        ui.add_space(8.0);
    }

    /// Draw the charts of the active tab.
    pub fn show(&mut self, ui: &mut egui::Ui, content: &TabContent, config: &DashboardConfig) {
        let palette = &config.palette;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match content {
                TabContent::Overview { trend, cross_tab } => {
                    Self::show_panel(ui, trend, |ui, chart| {
                        ChartPlotter::draw_chart(ui, chart, palette)
                    });

                    ui.add_space(15.0);
                    ui.separator();
                    ui.label(
                        RichText::new("Vehicles and Accidents by Subdivision")
                            .size(18.0)
                            .strong(),
                    );
                    ui.add_space(5.0);
                    Self::show_panel(ui, cross_tab, |ui, chart| {
                        ChartPlotter::draw_chart(ui, chart, palette)
                    });
                }
                TabContent::ByState(panel) => {
                    if let Some(view) = panel.ready() {
                        let mut entity = view.entity.clone();
                        ui.horizontal(|ui| {
                            ui.label(format!("Subdivision (top {}):", view.ranking.len()));
                            ComboBox::from_id_salt("state_entity")
                                .width(200.0)
                                .selected_text(&entity)
                                .show_ui(ui, |ui| {
                                    for (name, total) in &view.ranking {
                                        let text = format!(
                                            "{} ({})",
                                            name,
                                            StatsCalculator::format_count(*total)
                                        );
                                        ui.selectable_value(&mut entity, name.clone(), text);
                                    }
                                });
                        });
                        if entity != view.entity {
                            self.state_entity = Some(entity);
                        }
                        ui.add_space(8.0);

                        ui.columns(2, |cols| {
                            ChartPlotter::draw_chart(&mut cols[0], &view.classes, palette);
                            ChartPlotter::draw_chart(&mut cols[1], &view.types, palette);
                        });
                    } else if let Some(message) = panel.warning() {
                        Self::warning(ui, message);
                    }
                }
                TabContent::Causes { causes, variation } => {
                    ChartPlotter::draw_chart(ui, &causes.chart, palette);

                    ui.add_space(8.0);
                    for line in causes.insights() {
                        ui.label(RichText::new(format!("• {}", line)).size(13.0));
                    }

                    ui.add_space(15.0);
                    ui.separator();
                    ChartPlotter::draw_chart(ui, variation, palette);
                }
                TabContent::Phrases(panel) => {
                    Self::show_panel(ui, panel, |ui, phrases| {
                        for phrase in phrases {
                            ui.label(format!("• {}", phrase));
                        }
                    });
                }
                TabContent::Glossary => {
                    for (term, definition) in GLOSSARY {
                        ui.label(RichText::new(term).strong());
                        ui.label(definition);
                        ui.add_space(6.0);
                    }
                }
            });
    }

    /// Multi-select of trend years; order follows the clicks.
    fn trend_selector(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label("Years:");
            for year in &self.years {
                let mut checked = self.trend_years.contains(year);
                if ui.checkbox(&mut checked, year.as_str()).changed() {
                    if checked {
                        self.trend_years.push(year.clone());
                    } else {
                        self.trend_years.retain(|y| y != year);
                    }
                }
            }
            if ui.small_button("Select All").clicked() {
                self.trend_years = self.years.clone();
            }
            if ui.small_button("Clear All").clicked() {
                self.trend_years.clear();
            }
        });
    }

    fn year_selector(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        years: &[String],
        selected: &mut String,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ComboBox::from_id_salt(id)
                .width(100.0)
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for year in years {
                        ui.selectable_value(selected, year.clone(), year.as_str());
                    }
                });
        });
    }

    fn show_panel<T>(ui: &mut egui::Ui, panel: &Panel<T>, draw: impl FnOnce(&mut egui::Ui, &T)) {
        match panel {
            Panel::Ready(content) => draw(ui, content),
            Panel::Warning(message) => Self::warning(ui, message),
        }
    }

    fn warning(ui: &mut egui::Ui, message: &str) {
        egui::Frame::none()
            .fill(Color32::from_rgb(255, 243, 205))
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!("⚠ {}", message))
                        .color(Color32::from_rgb(133, 100, 4)),
                );
            });
    }
}
