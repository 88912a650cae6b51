use crate::data::{LoaderError, LookupError, ProcessorError};
use thiserror::Error;

/// The single failure surfaced by the dashboard. Any variant halts rendering
/// of metrics and tabs for the current frame.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{0}")]
    Load(#[from] LoaderError),

    #[error("{0}")]
    Processing(#[from] ProcessorError),

    #[error("{0}")]
    Lookup(#[from] LookupError),

    #[error("The loading thread stopped before finishing")]
    LoadInterrupted,
}

impl DashboardError {
    pub const MESSAGE: &'static str = "Error loading the data";
    pub const HINT: &'static str = "Check that the spreadsheet files are present in the data \
                                    directory and have the expected format.";

    /// Headline text: the generic message followed by the underlying error.
    pub fn headline(&self) -> String {
        format!("{}: {}", Self::MESSAGE, self)
    }
}
