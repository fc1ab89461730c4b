use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("invalid vocabulary pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(
        "invalid region on page {page}: x0={x0:.1}, top={top:.1}, x1={x1:.1}, bottom={bottom:.1}"
    )]
    InvalidRegion {
        page: u32,
        x0: f64,
        top: f64,
        x1: f64,
        bottom: f64,
    },

    #[error("no pages available after applying selection")]
    NoPagesSelected,
}
