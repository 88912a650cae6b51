//! Accident Tables Module
//! Typed wrappers around the loaded DataFrames and the single-row lookup.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No value for {entity} / {variable} ({year}) in the {table} table")]
    NotFound {
        table: String,
        entity: String,
        variable: String,
        year: String,
    },
    #[error("{count} rows match {entity} / {variable} in the {table} table, expected one")]
    Ambiguous {
        table: String,
        entity: String,
        variable: String,
        count: usize,
    },
    #[error("The {0} table has no year columns")]
    NoYears(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Outcome of a "must find exactly one" query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    Unique(f64),
    Missing,
    Ambiguous(usize),
}

/// Row predicate on the entity or variable column.
#[derive(Debug, Clone, Copy)]
pub enum Match<'a> {
    Is(&'a str),
    IsNot(&'a str),
}

impl Match<'_> {
    fn expr(self, column: &str) -> Expr {
        match self {
            Match::Is(value) => col(column).eq(lit(value)),
            Match::IsNot(value) => col(column).neq(lit(value)),
        }
    }
}

/// One (Entity, Variable) row with values aligned to the requested years.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub entity: String,
    pub variable: String,
    pub values: Vec<Option<f64>>,
}

/// True for 4-digit year labels such as "2023".
pub fn is_year_label(label: &str) -> bool {
    label.len() == 4 && label.chars().all(|c| c.is_ascii_digit())
}

/// Cause, class, type or victim table: rows keyed by (Entity, Variable), one column per year.
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    name: String,
    df: DataFrame,
    entity_col: String,
    variable_col: String,
    years: Vec<String>,
}

impl IndicatorTable {
    /// Wrap an already normalized frame. Year columns are detected from the headers.
    pub fn new(name: &str, df: DataFrame, entity_col: &str, variable_col: &str) -> Self {
        let years = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|s| is_year_label(s))
            .collect();

        Self {
            name: name.to_string(),
            df,
            entity_col: entity_col.to_string(),
            variable_col: variable_col.to_string(),
            years,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Year columns in source column order.
    pub fn years(&self) -> &[String] {
        &self.years
    }

    /// Most recent year column.
    pub fn latest_year(&self) -> Option<&str> {
        self.years.iter().max().map(|s| s.as_str())
    }

    /// Filter rows and extract the requested year columns, preserving source row order.
    pub fn select(
        &self,
        entity: Match<'_>,
        variable: Match<'_>,
        years: &[String],
    ) -> PolarsResult<Vec<IndicatorRow>> {
        let mut columns = vec![col(self.entity_col.as_str()), col(self.variable_col.as_str())];
        columns.extend(years.iter().map(|y| col(y.as_str())));

        let out = self
            .df
            .clone()
            .lazy()
            .filter(
                entity
                    .expr(&self.entity_col)
                    .and(variable.expr(&self.variable_col)),
            )
            .select(columns)
            .collect()?;

        let entities = out.column(&self.entity_col)?.str()?;
        let variables = out.column(&self.variable_col)?.str()?;
        let value_columns = years
            .iter()
            .map(|y| out.column(y).and_then(|c| c.f64()))
            .collect::<PolarsResult<Vec<_>>>()?;

        let rows = (0..out.height())
            .map(|i| IndicatorRow {
                entity: entities.get(i).unwrap_or_default().to_string(),
                variable: variables.get(i).unwrap_or_default().to_string(),
                values: value_columns.iter().map(|ca| ca.get(i)).collect(),
            })
            .collect();

        Ok(rows)
    }

    /// Single-year variant of [`select`](Self::select): (entity, variable, value) triples.
    pub fn select_year(
        &self,
        entity: Match<'_>,
        variable: Match<'_>,
        year: &str,
    ) -> PolarsResult<Vec<(String, String, Option<f64>)>> {
        let rows = self.select(entity, variable, &[year.to_string()])?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let value = row.values.first().copied().flatten();
                (row.entity, row.variable, value)
            })
            .collect())
    }

    /// Exact (entity, variable) lookup for one year.
    pub fn lookup(&self, entity: &str, variable: &str, year: &str) -> PolarsResult<Lookup> {
        let rows = self.select_year(Match::Is(entity), Match::Is(variable), year)?;
        Ok(match rows.as_slice() {
            [(_, _, Some(value))] => Lookup::Unique(*value),
            [(_, _, None)] | [] => Lookup::Missing,
            many => Lookup::Ambiguous(many.len()),
        })
    }

    /// Like [`lookup`](Self::lookup) but anything other than a unique value is an error.
    pub fn require(&self, entity: &str, variable: &str, year: &str) -> Result<f64, LookupError> {
        match self.lookup(entity, variable, year)? {
            Lookup::Unique(value) => Ok(value),
            Lookup::Missing => Err(LookupError::NotFound {
                table: self.name.clone(),
                entity: entity.to_string(),
                variable: variable.to_string(),
                year: year.to_string(),
            }),
            Lookup::Ambiguous(count) => Err(LookupError::Ambiguous {
                table: self.name.clone(),
                entity: entity.to_string(),
                variable: variable.to_string(),
                count,
            }),
        }
    }

    /// The single row matching (entity, variable) across `years`.
    pub fn require_row(
        &self,
        entity: &str,
        variable: &str,
        years: &[String],
    ) -> Result<IndicatorRow, LookupError> {
        let mut rows = self.select(Match::Is(entity), Match::Is(variable), years)?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(LookupError::NotFound {
                table: self.name.clone(),
                entity: entity.to_string(),
                variable: variable.to_string(),
                year: years.join(", "),
            }),
            count => Err(LookupError::Ambiguous {
                table: self.name.clone(),
                entity: entity.to_string(),
                variable: variable.to_string(),
                count,
            }),
        }
    }
}

/// Vehicle-registration table in its native headers.
#[derive(Debug, Clone)]
pub struct VehicleTable {
    df: DataFrame,
    entity_col: String,
    total_col: String,
}

impl VehicleTable {
    pub fn new(df: DataFrame, entity_col: &str, total_col: &str) -> Self {
        Self {
            df,
            entity_col: entity_col.to_string(),
            total_col: total_col.to_string(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn entity_col(&self) -> &str {
        &self.entity_col
    }

    pub fn total_col(&self) -> &str {
        &self.total_col
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// The five loaded sources.
#[derive(Debug, Clone)]
pub struct AccidentTables {
    pub causes: IndicatorTable,
    pub classes: IndicatorTable,
    pub types: IndicatorTable,
    pub victims: IndicatorTable,
    pub vehicles: VehicleTable,
}

impl AccidentTables {
    /// Available years, taken from the cause table.
    pub fn years(&self) -> &[String] {
        self.causes.years()
    }

    /// Latest year present in the cause table.
    pub fn latest_year(&self) -> Result<String, LookupError> {
        self.causes
            .latest_year()
            .map(|s| s.to_string())
            .ok_or_else(|| LookupError::NoYears(self.causes.name().to_string()))
    }

    /// Cause-table years that the class and type tables also carry.
    pub fn state_years(&self) -> Vec<String> {
        self.causes
            .years()
            .iter()
            .filter(|y| self.classes.years().contains(y) && self.types.years().contains(y))
            .cloned()
            .collect()
    }
}
