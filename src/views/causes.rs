//! Causes & variation view.

use crate::charts::{ChartData, ChartKind, Series, ValueFormat};
use crate::config::{Palette, SourceSchema};
use crate::data::{AccidentTables, DataProcessor, ProcessorError};
use crate::stats::{Share, StatsCalculator, Variation};

/// Cause shares for one year, plus the two insight figures shown under the chart.
#[derive(Debug, Clone)]
pub struct CausesView {
    pub year: String,
    pub chart: ChartData,
    /// Sum of all cause counts for the year
    pub total: f64,
    pub leading: Option<Share>,
}

impl CausesView {
    pub fn insights(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Total accidents in {}: {}",
            self.year,
            StatsCalculator::format_count(self.total)
        )];
        if let Some(leading) = &self.leading {
            lines.push(format!(
                "Leading cause: {} ({} accidents, {:.2}%)",
                leading.label,
                StatsCalculator::format_count(leading.count),
                leading.percent
            ));
        }
        lines
    }
}

/// Each national cause's share of the year's cause total, as ascending horizontal bars.
pub fn causes_view(
    tables: &AccidentTables,
    year: &str,
    schema: &SourceSchema,
    palette: &Palette,
) -> Result<CausesView, ProcessorError> {
    let rows = DataProcessor::national_cause_series(&tables.causes, &[year.to_string()], schema)?;
    let counts: Vec<(String, f64)> = rows
        .into_iter()
        .filter_map(|row| row.values.first().copied().flatten().map(|v| (row.variable, v)))
        .collect();

    let mut shares = StatsCalculator::percentage_shares(&counts);
    StatsCalculator::sort_by_count_ascending(&mut shares);

    let total = counts.iter().map(|(_, v)| v).sum();
    let leading = shares.last().cloned();

    let chart = ChartData::new(
        "causes",
        format!("Accident Causes ({})", year),
        ChartKind::HorizontalBar,
    )
    .categories(shares.iter().map(|s| s.label.clone()).collect())
    .series(Series {
        name: year.to_string(),
        color: palette.primary(),
        values: shares.iter().map(|s| Some(s.count)).collect(),
    })
    .value_labels(shares.iter().map(|s| format!("{:.1}%", s.percent)).collect())
    .axis_labels("Number of accidents", "Cause")
    .grid(true, false)
    .height(450.0);

    Ok(CausesView {
        year: year.to_string(),
        chart,
        total,
        leading,
    })
}

/// Year-over-year variation of every national cause, in long form.
pub fn variation_long(
    tables: &AccidentTables,
    schema: &SourceSchema,
) -> Result<Vec<Variation>, ProcessorError> {
    let years = tables.years();
    let rows = DataProcessor::national_cause_series(&tables.causes, years, schema)?;
    Ok(StatsCalculator::year_over_year(&rows, years))
}

/// One line per cause across the synthetic "<curr> vs <prev>" periods.
pub fn variation_chart(variations: &[Variation], palette: &Palette) -> ChartData {
    let mut periods: Vec<String> = Vec::new();
    let mut causes: Vec<String> = Vec::new();
    for v in variations {
        if !periods.contains(&v.period) {
            periods.push(v.period.clone());
        }
        if !causes.contains(&v.variable) {
            causes.push(v.variable.clone());
        }
    }

    let colors = palette.series();
    let mut chart = ChartData::new(
        "variation",
        "Year-over-Year Variation of Accident Causes",
        ChartKind::Line,
    )
    .axis_labels("Period", "Variation (%)")
    .value_format(ValueFormat::Percent)
    .legend(true);

    for (idx, cause) in causes.iter().enumerate() {
        let values = periods
            .iter()
            .map(|period| {
                variations
                    .iter()
                    .find(|v| &v.variable == cause && &v.period == period)
                    .and_then(|v| v.percent)
            })
            .collect();
        chart = chart.series(Series {
            name: cause.clone(),
            color: colors[idx % colors.len()],
            values,
        });
    }

    chart.categories(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn shares_are_ascending_and_sum_to_one_hundred() {
        let view = causes_view(
            &fixtures::tables(),
            "2023",
            &SourceSchema::default(),
            &Palette::default(),
        )
        .unwrap();

        assert_eq!(
            view.chart.categories,
            [
                "Falla del vehículo",
                "Peatón o pasajero",
                "Mala condición del camino",
                "Conductor"
            ]
        );
        assert_eq!(view.chart.value_labels, ["2.3%", "11.4%", "20.6%", "65.7%"]);
        assert_eq!(view.total, 350_000.0);

        let shares = StatsCalculator::percentage_shares(&[
            ("a".to_string(), 8_000.0),
            ("b".to_string(), 40_000.0),
            ("c".to_string(), 72_000.0),
            ("d".to_string(), 230_000.0),
        ]);
        let sum: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn insights_name_the_leading_cause() {
        let view = causes_view(
            &fixtures::tables(),
            "2023",
            &SourceSchema::default(),
            &Palette::default(),
        )
        .unwrap();
        assert_eq!(
            view.insights(),
            [
                "Total accidents in 2023: 350,000",
                "Leading cause: Conductor (230,000 accidents, 65.71%)"
            ]
        );
    }

    #[test]
    fn variation_is_undefined_after_a_zero_year() {
        let tables = fixtures::tables();
        let variations = variation_long(&tables, &SourceSchema::default()).unwrap();

        // 4 causes over 3 consecutive pairs
        assert_eq!(variations.len(), 12);
        let falla = |period: &str| {
            variations
                .iter()
                .find(|v| v.variable == "Falla del vehículo" && v.period == period)
                .unwrap()
                .percent
        };
        assert_eq!(falla("2021 vs 2020"), None);
        assert_eq!(falla("2022 vs 2021"), Some(20.0));
        assert!(variations
            .iter()
            .filter_map(|v| v.percent)
            .all(|p| p.is_finite()));
    }

    #[test]
    fn variation_chart_has_one_line_per_cause() {
        let tables = fixtures::tables();
        let variations = variation_long(&tables, &SourceSchema::default()).unwrap();
        let chart = variation_chart(&variations, &Palette::default());

        assert_eq!(chart.categories, ["2021 vs 2020", "2022 vs 2021", "2023 vs 2022"]);
        assert_eq!(chart.series.len(), 4);
        assert_eq!(chart.series[0].name, "Conductor");
        assert_eq!(chart.series[0].values[0], Some(5.0));
        assert_eq!(chart.series[2].values[0], None);
        assert_eq!(chart.value_format, ValueFormat::Percent);
    }
}
