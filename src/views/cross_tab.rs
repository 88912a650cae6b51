//! Vehicle registrations by subdivision, grouped by vehicle category.

use super::Panel;
use crate::charts::{ChartData, ChartKind, Series};
use crate::config::{Palette, SourceSchema, VehicleCategory};
use crate::data::{DataProcessor, ProcessorError, TOTAL_ACCIDENTS, VEHICLES, VEHICLE_TYPE};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::warn;

pub const NO_MATCHES: &str = "No matching subdivisions were found between the vehicle and accident data.";

/// Grouped bars, one group per subdivision and one colour per vehicle category.
///
/// The cross-tab is melted to long form first; a merge with no rows yields a warning.
pub fn cross_tab_chart(
    cross: &DataFrame,
    year: &str,
    schema: &SourceSchema,
    categories: &[VehicleCategory],
    palette: &Palette,
) -> Result<Panel<ChartData>, ProcessorError> {
    if cross.height() == 0 {
        warn!("cross-tab view: vehicle and accident sources share no subdivision");
        return Ok(Panel::Warning(NO_MATCHES.to_string()));
    }

    let entity_col = schema.entity_column.as_str();
    let data_cols: Vec<&str> = categories.iter().map(|c| c.column.as_str()).collect();
    let long = DataProcessor::stack_to_long(cross, &[entity_col, TOTAL_ACCIDENTS], &data_cols)?;

    let entities = DataProcessor::entities(cross, entity_col)?;
    let entity_index: HashMap<&str, usize> = entities
        .iter()
        .enumerate()
        .map(|(i, e)| (e.as_str(), i))
        .collect();
    let category_index: HashMap<&str, usize> = data_cols
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i))
        .collect();

    let mut values: Vec<Vec<Option<f64>>> = vec![vec![None; entities.len()]; categories.len()];
    let long_entities = long.column(entity_col)?.str()?;
    let long_types = long.column(VEHICLE_TYPE)?.str()?;
    let long_values = long.column(VEHICLES)?.f64()?;

    for i in 0..long.height() {
        let (Some(entity), Some(kind)) = (long_entities.get(i), long_types.get(i)) else {
            continue;
        };
        if let (Some(&e), Some(&c)) = (entity_index.get(entity), category_index.get(kind)) {
            values[c][e] = long_values.get(i);
        }
    }

    let chart = categories.iter().zip(values).enumerate().fold(
        ChartData::new(
            "cross_tab",
            format!("Registered Vehicles by Type and Subdivision ({})", year),
            ChartKind::GroupedBar,
        )
        .categories(entities)
        .axis_labels("Subdivision", "Total vehicles")
        .grid(false, true)
        .legend(true)
        .height(500.0),
        |chart, (idx, (category, values))| {
            chart.series(Series {
                name: category.label.clone(),
                color: palette.categorical(idx),
                values,
            })
        },
    );

    Ok(Panel::Ready(chart))
}
