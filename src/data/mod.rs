//! Data module - spreadsheet loading, typed tables and reshaping

mod loader;
mod processor;
mod tables;

#[cfg(test)]
pub(crate) mod fixtures;

pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, ProcessorError, TOTAL_ACCIDENTS, VEHICLES, VEHICLE_TYPE};
pub use tables::{AccidentTables, IndicatorRow, LookupError};
