//! Marketing phrases from the vehicle/accident cross-tab.

use super::Panel;
use crate::config::{SourceSchema, VehicleCategory};
use crate::data::ProcessorError;
use polars::prelude::*;
use tracing::warn;

pub const NOT_ENOUGH_DATA: &str = "Not enough data to generate sales phrases.";

/// One sentence per (subdivision, category with a positive count).
///
/// Rows are visited in cross-tab order and categories in configured order.
pub fn sales_phrases(
    cross: &DataFrame,
    schema: &SourceSchema,
    categories: &[VehicleCategory],
) -> Result<Panel<Vec<String>>, ProcessorError> {
    if cross.height() == 0 {
        warn!("phrase view: empty cross-tab");
        return Ok(Panel::Warning(NOT_ENOUGH_DATA.to_string()));
    }

    let entities = cross.column(&schema.entity_column)?.str()?;
    let counts = categories
        .iter()
        .map(|c| cross.column(&c.column).and_then(|s| s.f64()))
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut phrases = Vec::new();
    for i in 0..cross.height() {
        let Some(entity) = entities.get(i) else {
            continue;
        };
        for (category, ca) in categories.iter().zip(&counts) {
            if ca.get(i).is_some_and(|n| n > 0.0) {
                phrases.push(category.phrase_for(entity));
            }
        }
    }

    Ok(Panel::Ready(phrases))
}
