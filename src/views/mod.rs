//! View builders - one per dashboard tab
//!
//! Each builder reads the loaded tables and returns either a chart description
//! or a user-facing warning. Nothing here draws.

mod causes;
mod cross_tab;
mod glossary;
mod per_state;
mod phrases;
mod trend;

pub use causes::{causes_view, variation_chart, variation_long, CausesView};
pub use cross_tab::cross_tab_chart;
pub use glossary::GLOSSARY;
pub use per_state::{state_view, StateView};
pub use phrases::sales_phrases;
pub use trend::trend_chart;

/// A view result: content, or a soft "no data" warning shown instead of a chart.
#[derive(Debug, Clone)]
pub enum Panel<T> {
    Ready(T),
    Warning(String),
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(content) => Some(content),
            Panel::Warning(_) => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Panel::Ready(_) => None,
            Panel::Warning(message) => Some(message),
        }
    }
}
