//! Output module for crawl results
//!
//! This module handles:
//! - Writing the per-category CSV record file
//! - Printing the end-of-run summary

mod records;
mod summary;

pub use records::{write_records, RECORD_COLUMNS};
pub use summary::{format_summary, print_summary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
