//! Charts module - declarative chart data and egui drawing

mod plotter;

pub use plotter::{ChartData, ChartKind, ChartPlotter, Series, ValueFormat};
