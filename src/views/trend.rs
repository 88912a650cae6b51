//! National trend over a user-selected set of years.

use super::Panel;
use crate::charts::{ChartData, ChartKind, Series};
use crate::config::{Palette, SourceSchema};
use crate::data::{AccidentTables, DataProcessor, ProcessorError};
use tracing::debug;

pub const EMPTY_SELECTION: &str = "Please select at least one year to display the trend.";

/// Line of national total events, one point per selected year in selection order.
pub fn trend_chart(
    tables: &AccidentTables,
    selected: &[String],
    schema: &SourceSchema,
    palette: &Palette,
) -> Result<Panel<ChartData>, ProcessorError> {
    if selected.is_empty() {
        debug!("trend view: empty year selection");
        return Ok(Panel::Warning(EMPTY_SELECTION.to_string()));
    }

    let points = DataProcessor::national_trend(&tables.causes, selected, schema)?;
    let (years, values): (Vec<String>, Vec<Option<f64>>) = points.into_iter().unzip();

    let chart = ChartData::new("trend", "National Accident Trend", ChartKind::Line)
        .categories(years)
        .series(Series {
            name: "Accidents".to_string(),
            color: palette.primary(),
            values,
        })
        .axis_labels("Year", "Number of accidents");

    Ok(Panel::Ready(chart))
}
