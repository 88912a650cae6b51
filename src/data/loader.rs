//! Spreadsheet Loader Module
//! Reads the five accident sources into Polars DataFrames and normalizes their labels.

use crate::config::{DashboardConfig, SourceSchema, VehicleCategory};
use crate::data::tables::{is_year_label, AccidentTables, IndicatorTable, VehicleTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load table: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to read spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        source: calamine::Error,
    },
    #[error("Source file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Spreadsheet {0} has no worksheet or no rows")]
    EmptySheet(PathBuf),
    #[error("The {table} table is missing the expected column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("The {0} table has no year columns")]
    NoYearColumns(String),
    #[error("No data loaded")]
    NoData,
}

/// Loads every source listed in the dashboard configuration.
pub struct DataLoader;

impl DataLoader {
    /// Load and normalize all five sources. Any failure aborts the whole load.
    pub fn load_all(config: &DashboardConfig) -> Result<AccidentTables, LoaderError> {
        let started = Instant::now();
        let sources = &config.sources;
        let files = [
            &sources.causes,
            &sources.classes,
            &sources.types,
            &sources.victims,
            &sources.vehicles,
        ];

        info!(data_dir = %config.data_dir.display(), "loading accident sources");

        // Read all files in parallel, order is preserved by collect
        let frames = files
            .par_iter()
            .map(|file| Self::read_source(&config.source_path(file)))
            .collect::<Result<Vec<DataFrame>, LoaderError>>()?;

        let [causes, classes, types, victims, vehicles]: [DataFrame; 5] =
            frames.try_into().map_err(|_| LoaderError::NoData)?;

        let schema = &config.schema;
        let tables = AccidentTables {
            causes: Self::indicator_table("causes", causes, schema)?,
            classes: Self::indicator_table("classes", classes, schema)?,
            types: Self::indicator_table("types", types, schema)?,
            victims: Self::indicator_table("victims", victims, schema)?,
            vehicles: Self::vehicle_table(vehicles, schema, &config.vehicle_categories)?,
        };

        info!(
            causes = tables.causes.height(),
            classes = tables.classes.height(),
            types = tables.types.height(),
            victims = tables.victims.height(),
            vehicles = tables.vehicles.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sources loaded"
        );

        Ok(tables)
    }

    /// Read one source file, dispatching on its extension.
    pub fn read_source(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        debug!(path = %path.display(), format = %extension, "reading source");

        match extension.as_str() {
            "csv" => Self::read_csv(path),
            "xlsx" | "xlsm" | "xls" | "ods" => Self::read_spreadsheet(path),
            _ => Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Read the first worksheet; the first row holds the headers.
    fn read_spreadsheet(path: &Path) -> Result<DataFrame, LoaderError> {
        let spreadsheet_error = |source| LoaderError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook = open_workbook_auto(path).map_err(spreadsheet_error)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoaderError::EmptySheet(path.to_path_buf()))?
            .map_err(spreadsheet_error)?;

        Self::range_to_frame(path, &range)
    }

    /// Convert a worksheet range into a DataFrame.
    ///
    /// A column is Float64 when every non-empty cell is numeric, String otherwise.
    fn range_to_frame(path: &Path, range: &Range<Data>) -> Result<DataFrame, LoaderError> {
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Err(LoaderError::EmptySheet(path.to_path_buf()));
        };
        let body: Vec<&[Data]> = rows.collect();

        let columns = header
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let name = cell_text(cell).unwrap_or_else(|| format!("column_{}", idx));
                let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(idx)).collect();

                let numeric = cells
                    .iter()
                    .flatten()
                    .all(|c| matches!(c, Data::Int(_) | Data::Float(_) | Data::Empty));

                if numeric {
                    let values: Vec<Option<f64>> =
                        cells.iter().map(|c| c.and_then(cell_number)).collect();
                    Column::new(name.into(), values)
                } else {
                    let values: Vec<Option<String>> =
                        cells.iter().map(|c| c.and_then(cell_text)).collect();
                    Column::new(name.into(), values)
                }
            })
            .collect::<Vec<Column>>();

        Ok(DataFrame::new(columns)?)
    }

    /// Strip the absolute-value marker from every label, cast year columns to
    /// Float64 and the key columns to String.
    pub fn normalize_indicator(
        table: &str,
        df: &DataFrame,
        schema: &SourceSchema,
    ) -> Result<DataFrame, LoaderError> {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                let name = strip_absolute_marker(column.name().as_str(), &schema.absolute_marker);
                let target = if is_year_label(&name) {
                    DataType::Float64
                } else {
                    DataType::String
                };
                Ok(column.cast(&target)?.with_name(name.into()))
            })
            .collect::<Result<Vec<Column>, PolarsError>>()?;

        let normalized = DataFrame::new(columns)?;

        for required in [&schema.entity_column, &schema.variable_column] {
            require_column(table, &normalized, required)?;
        }
        if !normalized
            .get_column_names()
            .iter()
            .any(|name| is_year_label(name.as_str()))
        {
            return Err(LoaderError::NoYearColumns(table.to_string()));
        }

        Ok(normalized)
    }

    /// Normalize and wrap a cause/class/type/victim frame.
    pub fn indicator_table(
        table: &str,
        df: DataFrame,
        schema: &SourceSchema,
    ) -> Result<IndicatorTable, LoaderError> {
        let normalized = Self::normalize_indicator(table, &df, schema)?;
        Ok(IndicatorTable::new(
            table,
            normalized,
            &schema.entity_column,
            &schema.variable_column,
        ))
    }

    /// Validate the vehicle-registration frame. Headers stay native.
    pub fn vehicle_table(
        df: DataFrame,
        schema: &SourceSchema,
        categories: &[VehicleCategory],
    ) -> Result<VehicleTable, LoaderError> {
        let table = "vehicles";
        let numeric_columns: Vec<&str> = categories
            .iter()
            .map(|c| c.column.as_str())
            .chain(std::iter::once(schema.vehicle_total_column.as_str()))
            .collect();

        require_column(table, &df, &schema.vehicle_entity_column)?;
        for column in &numeric_columns {
            require_column(table, &df, column)?;
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                let name = column.name().as_str();
                if name == schema.vehicle_entity_column {
                    column.cast(&DataType::String)
                } else if numeric_columns.contains(&name) {
                    column.cast(&DataType::Float64)
                } else {
                    Ok(column.clone())
                }
            })
            .collect::<Result<Vec<Column>, PolarsError>>()?;

        Ok(VehicleTable::new(
            DataFrame::new(columns)?,
            &schema.vehicle_entity_column,
            &schema.vehicle_total_column,
        ))
    }
}

/// Remove the absolute-value marker suffix from a label. Idempotent.
pub fn strip_absolute_marker(label: &str, marker: &str) -> String {
    if marker.is_empty() {
        return label.to_string();
    }
    label.trim_end_matches(marker).to_string()
}

fn require_column(table: &str, df: &DataFrame, column: &str) -> Result<(), LoaderError> {
    if df.get_column_names().iter().any(|name| name.as_str() == column) {
        Ok(())
    } else {
        Err(LoaderError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Int(i) => Some(i.to_string()),
        // Numeric headers such as 2023 are stored as floats
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}
