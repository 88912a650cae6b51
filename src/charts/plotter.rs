//! Chart Plotter Module
//! Declarative chart descriptions and their drawing with egui_plot.

use crate::config::Palette;
use crate::stats::StatsCalculator;
use egui::{Align2, Color32, FontId, RichText, Sense, Shape, Stroke};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints,
    Points, Text,
};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

/// Chart kinds the dashboard draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One line per series over the categories; `None` values leave a gap
    Line,
    Bar,
    /// Bars of every series side by side per category
    GroupedBar,
    HorizontalBar,
    /// Slices of the first series
    Pie,
}

/// How the value axis is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Count,
    Percent,
}

/// One named series, values aligned with the chart categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    pub values: Vec<Option<f64>>,
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    /// Slice colours for pie charts
    pub category_colors: Vec<Color32>,
    /// Text drawn next to each value of the first series
    pub value_labels: Vec<String>,
    pub x_label: String,
    pub y_label: String,
    pub value_format: ValueFormat,
    /// [x, y] grid lines
    pub grid: [bool; 2],
    pub show_legend: bool,
    pub height: f32,
}

impl ChartData {
    pub fn new(id: &str, title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            kind,
            categories: Vec::new(),
            series: Vec::new(),
            category_colors: Vec::new(),
            value_labels: Vec::new(),
            x_label: String::new(),
            y_label: String::new(),
            value_format: ValueFormat::Count,
            grid: [true, true],
            show_legend: false,
            height: 400.0,
        }
    }

    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn axis_labels(mut self, x: &str, y: &str) -> Self {
        self.x_label = x.to_string();
        self.y_label = y.to_string();
        self
    }

    pub fn value_labels(mut self, labels: Vec<String>) -> Self {
        self.value_labels = labels;
        self
    }

    pub fn category_colors(mut self, colors: Vec<Color32>) -> Self {
        self.category_colors = colors;
        self
    }

    pub fn value_format(mut self, format: ValueFormat) -> Self {
        self.value_format = format;
        self
    }

    pub fn grid(mut self, x: bool, y: bool) -> Self {
        self.grid = [x, y];
        self
    }

    pub fn legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Smallest and largest defined value over all series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Split a series into runs of consecutive defined values.
pub fn line_segments(values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push([i as f64, *v]),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Label of the category at an integer axis position.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Draws [`ChartData`] with egui_plot, or the egui painter for pies.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw a titled chart.
    pub fn draw_chart(ui: &mut egui::Ui, chart: &ChartData, palette: &Palette) {
        ui.label(RichText::new(&chart.title).size(15.0).strong());
        ui.add_space(4.0);

        match chart.kind {
            ChartKind::Pie => Self::draw_pie(ui, chart, palette),
            _ => Self::draw_plot(ui, chart, palette),
        }
    }

    fn draw_plot(ui: &mut egui::Ui, chart: &ChartData, palette: &Palette) {
        let horizontal = chart.kind == ChartKind::HorizontalBar;
        let labels = chart.categories.clone();
        let category_formatter =
            move |mark: GridMark, _range: &RangeInclusive<f64>| category_label(&labels, mark.value);
        let value_format = chart.value_format;
        let value_formatter = move |mark: GridMark, _range: &RangeInclusive<f64>| match value_format
        {
            ValueFormat::Count => StatsCalculator::format_count(mark.value),
            ValueFormat::Percent => format!("{:.0}%", mark.value),
        };

        let n_categories = chart.categories.len() as f64;
        let (lo, hi) = chart.value_range().unwrap_or((0.0, 1.0));
        // Headroom for value labels
        let value_min = lo.min(0.0) * 1.1;
        let value_max = hi.max(0.0) * 1.15;

        let mut plot = Plot::new(&chart.id)
            .height(chart.height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_grid(chart.grid)
            .x_axis_label(chart.x_label.clone())
            .y_axis_label(chart.y_label.clone());

        if chart.show_legend {
            plot = plot.legend(Legend::default());
        }

        plot = if horizontal {
            plot.y_axis_formatter(category_formatter)
                .y_grid_spacer(uniform_grid_spacer(|_input| [1.0, 5.0, 10.0]))
                .x_axis_formatter(value_formatter)
                .include_y(-0.6)
                .include_y(n_categories - 0.4)
                .include_x(value_min)
                .include_x(value_max)
        } else {
            plot.x_axis_formatter(category_formatter)
                .x_grid_spacer(uniform_grid_spacer(|_input| [1.0, 5.0, 10.0]))
                .y_axis_formatter(value_formatter)
                .include_x(-0.6)
                .include_x(n_categories - 0.4)
                .include_y(value_min)
                .include_y(value_max)
        };

        let text_color = palette.series().get(3).copied().unwrap_or(Color32::BLACK);

        plot.show(ui, |plot_ui| {
            match chart.kind {
                ChartKind::Line => {
                    for series in &chart.series {
                        for segment in line_segments(&series.values) {
                            plot_ui.line(
                                Line::new(PlotPoints::from(segment.clone()))
                                    .color(series.color)
                                    .width(3.0)
                                    .name(&series.name),
                            );
                            plot_ui.points(
                                Points::new(PlotPoints::from(segment))
                                    .radius(4.0)
                                    .color(series.color)
                                    .name(&series.name),
                            );
                        }
                    }
                }
                _ => {
                    let n_series = chart.series.len().max(1);
                    let group_width = 0.8;
                    let bar_width = group_width / n_series as f64;

                    for (s, series) in chart.series.iter().enumerate() {
                        let offset = if n_series == 1 {
                            0.0
                        } else {
                            -group_width / 2.0 + bar_width * (s as f64 + 0.5)
                        };

                        let bars: Vec<Bar> = series
                            .values
                            .iter()
                            .enumerate()
                            .filter_map(|(i, value)| {
                                value.map(|v| {
                                    Bar::new(i as f64 + offset, v)
                                        .width(bar_width * 0.95)
                                        .fill(series.color)
                                        .name(chart.categories.get(i).cloned().unwrap_or_default())
                                })
                            })
                            .collect();

                        let mut bar_chart = BarChart::new(bars)
                            .color(series.color)
                            .name(&series.name);
                        if horizontal {
                            bar_chart = bar_chart.horizontal();
                        }
                        plot_ui.bar_chart(bar_chart);
                    }
                }
            }

            if let Some(series) = chart.series.first() {
                for (i, (value, label)) in series.values.iter().zip(&chart.value_labels).enumerate()
                {
                    let Some(value) = value else {
                        continue;
                    };
                    let (position, anchor) = if horizontal {
                        (PlotPoint::new(*value, i as f64), Align2::LEFT_CENTER)
                    } else {
                        (PlotPoint::new(i as f64, *value), Align2::CENTER_BOTTOM)
                    };
                    plot_ui.text(
                        Text::new(position, RichText::new(label).size(11.0).color(text_color))
                            .anchor(anchor),
                    );
                }
            }
        });
    }

    /// Pie of the first series with percent and label on each slice.
    fn draw_pie(ui: &mut egui::Ui, chart: &ChartData, palette: &Palette) {
        let slices: Vec<(usize, f64)> = chart
            .series
            .first()
            .map(|s| {
                s.values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.filter(|v| *v > 0.0).map(|v| (i, v)))
                    .collect()
            })
            .unwrap_or_default();
        let total: f64 = slices.iter().map(|(_, v)| v).sum();

        if total <= 0.0 {
            ui.label(RichText::new("No data").color(Color32::GRAY));
            return;
        }

        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), chart.height),
            Sense::hover(),
        );
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = rect.width().min(rect.height()) * 0.42;
        let edge = palette.background();

        let mut start = -FRAC_PI_2;
        let mut hovered: Option<String> = None;

        for (idx, value) in &slices {
            let fraction = (value / total) as f32;
            let sweep = TAU * fraction;
            let color = chart
                .category_colors
                .get(*idx)
                .copied()
                .unwrap_or_else(|| palette.categorical(*idx));

            // Fan of thin triangles keeps every piece convex
            let steps = ((sweep / 0.05).ceil() as usize).max(1);
            let rim: Vec<egui::Pos2> = (0..=steps)
                .map(|s| {
                    let angle = start + sweep * s as f32 / steps as f32;
                    center + radius * egui::vec2(angle.cos(), angle.sin())
                })
                .collect();
            for pair in rim.windows(2) {
                painter.add(Shape::convex_polygon(
                    vec![center, pair[0], pair[1]],
                    color,
                    Stroke::NONE,
                ));
            }
            painter.line_segment([center, rim[0]], Stroke::new(1.5, edge));

            let label = chart.categories.get(*idx).cloned().unwrap_or_default();
            let mid = start + sweep / 2.0;
            let text_pos = center + radius * 0.65 * egui::vec2(mid.cos(), mid.sin());
            painter.text(
                text_pos,
                Align2::CENTER_CENTER,
                format!("{}\n{:.1}%", label, fraction * 100.0),
                FontId::proportional(12.0),
                edge,
            );

            if let Some(pointer) = response.hover_pos() {
                let offset = pointer - center;
                if offset.length() <= radius {
                    let angle = (offset.y.atan2(offset.x) - start).rem_euclid(TAU);
                    if angle < sweep {
                        hovered = Some(format!(
                            "{}\n{:.1}%\n{}",
                            label,
                            fraction * 100.0,
                            StatsCalculator::format_count(*value)
                        ));
                    }
                }
            }

            start += sweep;
        }

        if let Some(text) = hovered {
            response.on_hover_text_at_pointer(text);
        }
    }
}
