//! Headline Metrics Module
//! The four national scalar totals shown above the tabs.

use crate::config::SourceSchema;
use crate::data::{AccidentTables, LookupError};

/// National totals for the latest year present in the cause table.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineMetrics {
    pub year: String,
    pub total_events: f64,
    pub fatalities: f64,
    pub injuries: f64,
    pub fatal_accidents: f64,
}

impl HeadlineMetrics {
    /// Each value must match exactly one (national, variable) row.
    pub fn extract(tables: &AccidentTables, schema: &SourceSchema) -> Result<Self, LookupError> {
        let year = tables.latest_year()?;
        let national = schema.national.as_str();

        Ok(Self {
            total_events: tables.causes.require(national, &schema.total_events, &year)?,
            fatalities: tables.victims.require(national, &schema.fatalities, &year)?,
            injuries: tables.victims.require(national, &schema.injuries, &year)?,
            fatal_accidents: tables.classes.require(national, &schema.fatal_class, &year)?,
            year,
        })
    }

    /// (caption, value) pairs in display order.
    pub fn cards(&self) -> [(String, f64); 4] {
        [
            (format!("Total Events ({})", self.year), self.total_events),
            (format!("Fatal Victims ({})", self.year), self.fatalities),
            (format!("Injured ({})", self.year), self.injuries),
            (format!("Fatal Accidents ({})", self.year), self.fatal_accidents),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::stats::StatsCalculator;

    #[test]
    fn extracts_latest_year_national_totals() {
        let tables = fixtures::tables();
        let metrics = HeadlineMetrics::extract(&tables, &SourceSchema::default()).unwrap();

        assert_eq!(
            metrics,
            HeadlineMetrics {
                year: "2023".to_string(),
                total_events: 350_000.0,
                fatalities: 4_500.0,
                injuries: 85_000.0,
                fatal_accidents: 3_000.0,
            }
        );
        assert_eq!(StatsCalculator::format_count(metrics.total_events), "350,000");
        assert_eq!(metrics.cards()[0].0, "Total Events (2023)");
    }

    #[test]
    fn missing_metric_row_is_an_error() {
        let tables = fixtures::tables();
        let schema = SourceSchema {
            fatal_class: "Fatal".to_string(),
            ..SourceSchema::default()
        };
        assert!(matches!(
            HeadlineMetrics::extract(&tables, &schema),
            Err(LookupError::NotFound { ref table, .. }) if table == "classes"
        ));
    }
}
