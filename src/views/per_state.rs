//! Per-state view: top subdivisions for a year, then class and type breakdowns.

use super::Panel;
use crate::charts::{ChartData, ChartKind, Series};
use crate::config::{Palette, SourceSchema};
use crate::data::{AccidentTables, DataProcessor, ProcessorError};
use crate::stats::StatsCalculator;
use tracing::{debug, warn};

pub const NO_SUBDIVISIONS: &str = "No subdivision data is available for the selected year.";

/// Ranking plus the two charts for the chosen subdivision.
#[derive(Debug, Clone)]
pub struct StateView {
    /// Top subdivisions by total events, largest first
    pub ranking: Vec<(String, f64)>,
    /// The subdivision the charts describe; always a member of `ranking`
    pub entity: String,
    pub classes: ChartData,
    pub types: ChartData,
}

/// Build the per-state view for `year`.
///
/// `requested` is the user's pick; it falls back to the first ranked subdivision
/// when absent or no longer in the ranking.
pub fn state_view(
    tables: &AccidentTables,
    year: &str,
    requested: Option<&str>,
    schema: &SourceSchema,
    palette: &Palette,
    top_n: usize,
) -> Result<Panel<StateView>, ProcessorError> {
    let totals = DataProcessor::entity_totals(&tables.causes, year, schema)?;
    let ranking = StatsCalculator::top_n(&totals, top_n);

    let entity = match requested {
        Some(name) if ranking.iter().any(|(e, _)| e == name) => name.to_string(),
        _ => match ranking.first() {
            Some((first, _)) => first.clone(),
            None => {
                warn!(year, "per-state view: no subdivision rows");
                return Ok(Panel::Warning(NO_SUBDIVISIONS.to_string()));
            }
        },
    };
    debug!(year, entity = %entity, ranked = ranking.len(), "per-state view");

    let classes = class_chart(tables, &entity, year, schema, palette)?;
    let types = type_chart(tables, &entity, year, schema, palette)?;

    Ok(Panel::Ready(StateView {
        ranking,
        entity,
        classes,
        types,
    }))
}

fn class_chart(
    tables: &AccidentTables,
    entity: &str,
    year: &str,
    schema: &SourceSchema,
    palette: &Palette,
) -> Result<ChartData, ProcessorError> {
    let breakdown = DataProcessor::entity_breakdown(&tables.classes, entity, year, schema)?;
    let (labels, values): (Vec<String>, Vec<f64>) = breakdown.into_iter().unzip();
    let shades = palette.shades(labels.len());

    Ok(ChartData::new(
        "state_classes",
        format!("Accident Classes in {} ({})", entity, year),
        ChartKind::Pie,
    )
    .categories(labels)
    .series(Series {
        name: year.to_string(),
        color: palette.primary(),
        values: values.into_iter().map(Some).collect(),
    })
    .category_colors(shades))
}

fn type_chart(
    tables: &AccidentTables,
    entity: &str,
    year: &str,
    schema: &SourceSchema,
    palette: &Palette,
) -> Result<ChartData, ProcessorError> {
    let breakdown = DataProcessor::entity_breakdown(&tables.types, entity, year, schema)?;
    let labels = breakdown.iter().map(|(_, v)| format!("{:.0}", v)).collect();
    let (names, values): (Vec<String>, Vec<f64>) = breakdown.into_iter().unzip();

    Ok(ChartData::new(
        "state_types",
        format!("Accident Types in {} ({})", entity, year),
        ChartKind::Bar,
    )
    .categories(names)
    .series(Series {
        name: year.to_string(),
        color: palette.categorical(0),
        values: values.into_iter().map(Some).collect(),
    })
    .value_labels(labels)
    .axis_labels("Accident type", "Number of accidents")
    .grid(false, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn build(year: &str, requested: Option<&str>) -> Panel<StateView> {
        state_view(
            &fixtures::tables(),
            year,
            requested,
            &SourceSchema::default(),
            &Palette::default(),
            10,
        )
        .unwrap()
    }

    #[test]
    fn ranking_is_top_ten_with_stable_ties() {
        let panel = build("2023", None);
        let view = panel.ready().unwrap();

        assert_eq!(view.ranking.len(), 10);
        let names: Vec<&str> = view.ranking.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"Yucatán"));
        assert!(!names.contains(&"Tabasco"));
        assert!(!names.contains(&"Tlaxcala"));

        let guanajuato = names.iter().position(|n| *n == "Guanajuato").unwrap();
        let sonora = names.iter().position(|n| *n == "Sonora").unwrap();
        assert_eq!(sonora, guanajuato + 1);

        for pair in view.ranking.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn ranking_never_exceeds_available_subdivisions() {
        let panel = state_view(
            &fixtures::tables(),
            "2023",
            None,
            &SourceSchema::default(),
            &Palette::default(),
            50,
        )
        .unwrap();
        assert_eq!(panel.ready().unwrap().ranking.len(), fixtures::STATES.len());
    }

    #[test]
    fn selection_falls_back_to_first_ranked() {
        assert_eq!(build("2023", None).ready().unwrap().entity, "Jalisco");
        assert_eq!(build("2023", Some("Tlaxcala")).ready().unwrap().entity, "Jalisco");
        assert_eq!(build("2023", Some("Sonora")).ready().unwrap().entity, "Sonora");
    }

    #[test]
    fn breakdowns_strip_marker_and_label_bars() {
        let panel = build("2023", Some("Jalisco"));
        let view = panel.ready().unwrap();

        assert_eq!(view.classes.kind, ChartKind::Pie);
        assert_eq!(view.classes.categories, ["Fatal", "No fatal", "Solo daños"]);
        assert_eq!(view.classes.category_colors.len(), 3);

        assert_eq!(
            view.types.categories,
            [
                "Colisión con vehículo automotor",
                "Colisión con peatón",
                "Volcadura"
            ]
        );
        assert_eq!(view.types.value_labels, ["33000", "6000", "1000"]);
        assert_eq!(view.types.grid, [false, true]);
    }

    #[test]
    fn subdivision_without_breakdown_rows_gives_empty_charts() {
        let panel = build("2023", Some("Sonora"));
        let view = panel.ready().unwrap();
        assert!(view.classes.categories.is_empty());
        assert!(view.types.series[0].values.is_empty());
    }

    #[test]
    fn year_without_rows_warns() {
        let mut tables = fixtures::tables();
        tables.causes = fixtures::indicator_table(
            "causes",
            &[("Nacional", "Total de eventos (Absoluto)", [1.0, 2.0, 3.0, 4.0])],
        );
        let panel = state_view(
            &tables,
            "2023",
            None,
            &SourceSchema::default(),
            &Palette::default(),
            10,
        )
        .unwrap();
        assert_eq!(panel.warning(), Some(NO_SUBDIVISIONS));
    }
}
