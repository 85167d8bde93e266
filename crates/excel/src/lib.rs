use thiserror::Error;

pub mod merge;
pub mod reader;
pub mod writer;

pub use merge::update_master;
pub use reader::read_grids;
pub use writer::{write_summary, SUMMARY_COLUMNS};

#[derive(Debug, Error)]
pub enum ExcelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to open workbook: {0}")]
    Open(String),
    #[error("Failed to read sheet '{sheet}': {message}")]
    Sheet { sheet: String, message: String },
    #[error("Failed to write workbook: {0}")]
    Write(String),
}
