//! Data Processor Module
//! Filters, the vehicle/accident cross-tab merge and the wide-to-long stack operation.

use crate::config::{SourceSchema, VehicleCategory};
use crate::data::loader::strip_absolute_marker;
use crate::data::tables::{AccidentTables, IndicatorRow, IndicatorTable, LookupError, Match};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Cross-tab column holding vehicle-registration totals (renamed from the native header).
pub const TOTAL_VEHICLES: &str = "Total vehicles";
/// Cross-tab column holding the subdivision's total events for the year.
pub const TOTAL_ACCIDENTS: &str = "Total accidents";
/// Long-format column names produced by [`DataProcessor::stack_to_long`].
pub const VEHICLE_TYPE: &str = "Vehicle type";
pub const VEHICLES: &str = "Vehicles";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("Stack operation requires at least one data column")]
    MissingDataColumns,
}

/// Handles filtering and reshaping of the loaded tables.
pub struct DataProcessor;

impl DataProcessor {
    /// National total events for each requested year, in request order.
    pub fn national_trend(
        causes: &IndicatorTable,
        years: &[String],
        schema: &SourceSchema,
    ) -> Result<Vec<(String, Option<f64>)>, ProcessorError> {
        let row = causes.require_row(&schema.national, &schema.total_events, years)?;
        Ok(years.iter().cloned().zip(row.values).collect())
    }

    /// Total events per subdivision (national row excluded) for one year.
    /// Rows without a value are dropped.
    pub fn entity_totals(
        causes: &IndicatorTable,
        year: &str,
        schema: &SourceSchema,
    ) -> Result<Vec<(String, f64)>, ProcessorError> {
        let rows = causes.select_year(
            Match::IsNot(&schema.national),
            Match::Is(&schema.total_events),
            year,
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|(entity, _, value)| value.map(|v| (entity, v)))
            .collect())
    }

    /// Every variable except total events for one entity and year, marker stripped.
    pub fn entity_breakdown(
        table: &IndicatorTable,
        entity: &str,
        year: &str,
        schema: &SourceSchema,
    ) -> Result<Vec<(String, f64)>, ProcessorError> {
        let rows = table.select_year(Match::Is(entity), Match::IsNot(&schema.total_events), year)?;
        Ok(rows
            .into_iter()
            .filter_map(|(_, variable, value)| {
                value.map(|v| (strip_absolute_marker(&variable, &schema.absolute_marker), v))
            })
            .collect())
    }

    /// National cause rows across several years, marker stripped.
    pub fn national_cause_series(
        causes: &IndicatorTable,
        years: &[String],
        schema: &SourceSchema,
    ) -> Result<Vec<IndicatorRow>, ProcessorError> {
        let rows = causes.select(
            Match::Is(&schema.national),
            Match::IsNot(&schema.total_events),
            years,
        )?;
        Ok(rows
            .into_iter()
            .map(|row| IndicatorRow {
                variable: strip_absolute_marker(&row.variable, &schema.absolute_marker),
                ..row
            })
            .collect())
    }

    /// Inner merge of vehicle registrations with subdivision total events for `year`.
    ///
    /// The vehicle entity and total headers are renamed to the entity column and
    /// [`TOTAL_VEHICLES`]. Rows keep vehicle-table order; each subdivision appears once.
    /// Missing registration counts are treated as zero. Subdivisions whose total-events
    /// cell is empty still join, with a null [`TOTAL_ACCIDENTS`].
    pub fn cross_tab(
        tables: &AccidentTables,
        year: &str,
        schema: &SourceSchema,
        categories: &[VehicleCategory],
    ) -> Result<DataFrame, ProcessorError> {
        let mut accidents: HashMap<String, Option<f64>> = HashMap::new();
        let rows = tables.causes.select_year(
            Match::IsNot(&schema.national),
            Match::Is(&schema.total_events),
            year,
        )?;
        for (entity, _, value) in rows {
            accidents.entry(entity).or_insert(value);
        }

        let vehicles = &tables.vehicles;
        let entity_col = schema.entity_column.as_str();
        let mut selection = vec![col(vehicles.entity_col()).alias(entity_col)];
        selection.extend(categories.iter().map(|c| col(c.column.as_str())));
        selection.push(col(vehicles.total_col()).alias(TOTAL_VEHICLES));

        let renamed = vehicles.frame().clone().lazy().select(selection).collect()?;

        let entity_ca = renamed.column(entity_col)?.str()?;
        let total_ca = renamed.column(TOTAL_VEHICLES)?.f64()?;
        let category_cas = categories
            .iter()
            .map(|c| renamed.column(&c.column).and_then(|s| s.f64()))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut entities: Vec<String> = Vec::new();
        let mut category_values: Vec<Vec<f64>> = vec![Vec::new(); categories.len()];
        let mut vehicle_totals: Vec<Option<f64>> = Vec::new();
        let mut accident_totals: Vec<Option<f64>> = Vec::new();

        for i in 0..renamed.height() {
            let Some(entity) = entity_ca.get(i) else {
                continue;
            };
            let Some(&accident_total) = accidents.get(entity) else {
                continue;
            };
            if !seen.insert(entity.to_string()) {
                continue;
            }

            entities.push(entity.to_string());
            for (values, ca) in category_values.iter_mut().zip(&category_cas) {
                values.push(ca.get(i).unwrap_or(0.0));
            }
            vehicle_totals.push(total_ca.get(i));
            accident_totals.push(accident_total);
        }

        let mut columns = vec![Column::new(entity_col.into(), entities)];
        for (category, values) in categories.iter().zip(category_values) {
            columns.push(Column::new(category.column.as_str().into(), values));
        }
        columns.push(Column::new(TOTAL_VEHICLES.into(), vehicle_totals));
        columns.push(Column::new(TOTAL_ACCIDENTS.into(), accident_totals));

        Ok(DataFrame::new(columns)?)
    }

    /// Transform multi-column data to long format (stack operation).
    ///
    /// Output columns: `id_cols..., VEHICLE_TYPE, VEHICLES`, one block per data column.
    pub fn stack_to_long(
        df: &DataFrame,
        id_cols: &[&str],
        data_cols: &[&str],
    ) -> Result<DataFrame, ProcessorError> {
        if data_cols.is_empty() {
            return Err(ProcessorError::MissingDataColumns);
        }

        let blocks: Vec<LazyFrame> = data_cols
            .iter()
            .map(|data_col| {
                let mut exprs: Vec<Expr> = id_cols.iter().map(|c| col(*c)).collect();
                exprs.push(lit(*data_col).alias(VEHICLE_TYPE));
                exprs.push(col(*data_col).cast(DataType::Float64).alias(VEHICLES));
                df.clone().lazy().select(exprs)
            })
            .collect();

        Ok(concat(blocks, UnionArgs::default())?.collect()?)
    }

    /// Subdivision names of a cross-tab, in row order.
    pub fn entities(df: &DataFrame, entity_col: &str) -> Result<Vec<String>, ProcessorError> {
        Ok(df
            .column(entity_col)?
            .str()?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::data::fixtures;

    fn cross(tables: &AccidentTables) -> DataFrame {
        let config = DashboardConfig::default();
        DataProcessor::cross_tab(tables, "2023", &config.schema, &config.vehicle_categories)
            .unwrap()
    }

    #[test]
    fn trend_follows_selection_order() {
        let tables = fixtures::tables();
        let schema = SourceSchema::default();
        let years = vec!["2023".to_string(), "2020".to_string()];

        let trend = DataProcessor::national_trend(&tables.causes, &years, &schema).unwrap();
        assert_eq!(
            trend,
            vec![
                ("2023".to_string(), Some(350_000.0)),
                ("2020".to_string(), Some(300_000.0)),
            ]
        );
    }

    #[test]
    fn cross_tab_is_bounded_by_both_sources() {
        let tables = fixtures::tables();
        let schema = SourceSchema::default();
        let df = cross(&tables);

        let accident_rows = DataProcessor::entity_totals(&tables.causes, "2023", &schema)
            .unwrap()
            .len();
        assert!(df.height() <= tables.vehicles.height().min(accident_rows));

        // Atlantis has registrations but no accident row
        let names = DataProcessor::entities(&df, &schema.entity_column).unwrap();
        assert_eq!(names, ["Jalisco", "Nuevo León", "Tlaxcala", "Chihuahua"]);
        let state_names: Vec<&str> = fixtures::STATES.iter().map(|(n, _)| *n).collect();
        for name in &names {
            assert!(state_names.contains(&name.as_str()));
        }

        let accidents = df.column(TOTAL_ACCIDENTS).unwrap().f64().unwrap();
        assert_eq!(accidents.get(0), Some(50_000.0));
        assert!(df.column(TOTAL_VEHICLES).is_ok());
    }

    #[test]
    fn cross_tab_skips_duplicate_subdivisions() {
        let mut tables = fixtures::tables();
        let schema = SourceSchema::default();
        let mut vehicles = fixtures::vehicle_frame();
        vehicles.vstack_mut(&fixtures::vehicle_frame().head(Some(1))).unwrap();
        tables.vehicles = crate::data::loader::DataLoader::vehicle_table(
            vehicles,
            &schema,
            &VehicleCategory::defaults(),
        )
        .unwrap();

        let df = cross(&tables);
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn empty_cross_tab_when_no_names_intersect() {
        let mut tables = fixtures::tables();
        let schema = SourceSchema::default();
        let vehicles = df!(
            "ENTIDAD FEDERATIVA" => ["Atlantis"],
            "AUTOMÓVILES SUMA" => [1.0],
            "CAMIONES PARA PASAJEROS SUMA" => [1.0],
            "CAMIONES Y CAMIONETAS PARA CARGA SUMA" => [1.0],
            "MOTOCICLETAS SUMA" => [1.0],
            "TOTAL" => [4.0]
        )
        .unwrap();
        tables.vehicles = crate::data::loader::DataLoader::vehicle_table(
            vehicles,
            &schema,
            &VehicleCategory::defaults(),
        )
        .unwrap();

        assert_eq!(cross(&tables).height(), 0);
    }

    #[test]
    fn cross_tab_keeps_subdivision_with_empty_total() {
        let mut tables = fixtures::tables();
        let schema = SourceSchema::default();
        let causes = df!(
            "Entidad" => ["Nacional", "Jalisco", "Chihuahua"],
            "Variable" => [
                "Total de eventos (Absoluto)",
                "Total de eventos (Absoluto)",
                "Total de eventos (Absoluto)"
            ],
            "2023" => [Some(350_000.0), None, Some(40_000.0)]
        )
        .unwrap();
        tables.causes =
            crate::data::loader::DataLoader::indicator_table("causes", causes, &schema).unwrap();

        let df = cross(&tables);
        let names = DataProcessor::entities(&df, &schema.entity_column).unwrap();
        assert_eq!(names, ["Jalisco", "Chihuahua"]);
        let accidents = df.column(TOTAL_ACCIDENTS).unwrap().f64().unwrap();
        assert_eq!(accidents.get(0), None);
        assert_eq!(accidents.get(1), Some(40_000.0));
    }

    #[test]
    fn stack_to_long_melts_one_block_per_category() {
        let tables = fixtures::tables();
        let schema = SourceSchema::default();
        let df = cross(&tables);
        let categories = VehicleCategory::defaults();
        let data_cols: Vec<&str> = categories.iter().map(|c| c.column.as_str()).collect();

        let long = DataProcessor::stack_to_long(
            &df,
            &[schema.entity_column.as_str(), TOTAL_ACCIDENTS],
            &data_cols,
        )
        .unwrap();

        assert_eq!(long.height(), df.height() * categories.len());
        let kinds = long.column(VEHICLE_TYPE).unwrap().str().unwrap();
        assert_eq!(kinds.get(0), Some("MOTOCICLETAS SUMA"));
        assert_eq!(kinds.get(df.height()), Some("AUTOMÓVILES SUMA"));
        let vehicles = long.column(VEHICLES).unwrap().f64().unwrap();
        assert_eq!(vehicles.get(0), Some(400_000.0));

        assert!(matches!(
            DataProcessor::stack_to_long(&df, &[], &[]),
            Err(ProcessorError::MissingDataColumns)
        ));
    }

    #[test]
    fn breakdown_excludes_total_and_strips_marker() {
        let tables = fixtures::tables();
        let schema = SourceSchema::default();
        let classes =
            DataProcessor::entity_breakdown(&tables.classes, "Jalisco", "2023", &schema).unwrap();
        assert_eq!(
            classes,
            vec![
                ("Fatal".to_string(), 500.0),
                ("No fatal".to_string(), 9_500.0),
                ("Solo daños".to_string(), 40_000.0),
            ]
        );
    }
}
