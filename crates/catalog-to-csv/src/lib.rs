mod anchor;
mod csv_out;
mod dataset;
mod error;
mod fields;
mod lines;
mod model;
mod options;
mod pdf_reader;
mod record;
mod regions;
mod vocabulary;
mod warning;
mod xlsx_out;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::pdf_reader::read_catalog_document;
use crate::record::PageExtractor;
use crate::warning::WarningCode;
use crate::xlsx_out::{write_xlsx, write_xlsx_to_buffer};

pub use anchor::{Anchor, AnchorPosition, AnchorStrategy, STYLE_CODE_LEN};
pub use dataset::{COLUMNS, Dataset};
pub use error::ExtractError;
pub use lines::{render_text, tokens_to_lines};
pub use model::{BBox, CatalogDocument, Line, PageLayout, PositionedToken, ProductRecord};
pub use options::{ExtractOptions, LayoutTolerances, MAX_SELECTED_PAGES, PageSelection};
pub use vocabulary::{UNCATEGORIZED, Vocabulary};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};
pub use xlsx_out::SHEET_NAME;

/// File format of a written dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Xlsx,
}

impl OutputFormat {
    /// `.xlsx` paths get a workbook; anything else is CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DocumentSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One input document and the label its records carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    pub label: String,
    source: DocumentSource,
}

impl DocumentInput {
    /// Labels the document with its file name.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Self {
            label,
            source: DocumentSource::Path(path),
        }
    }

    #[must_use]
    pub fn from_bytes(label: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            source: DocumentSource::Bytes(data),
        }
    }

    fn load(&self, options: &ExtractOptions) -> Result<CatalogDocument, ExtractError> {
        let tolerance = options.layout.line_tolerance;
        match &self.source {
            DocumentSource::Path(path) => {
                let bytes = std::fs::read(path)?;
                read_catalog_document(&self.label, &bytes, options.pages.as_ref(), tolerance)
            }
            DocumentSource::Bytes(data) => {
                read_catalog_document(&self.label, data, options.pages.as_ref(), tolerance)
            }
        }
    }
}

/// Reported after every processed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    pub processed: usize,
    pub total: usize,
    pub document: &'a str,
    pub page: u32,
}

impl Progress<'_> {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f64 / self.total as f64
    }
}

/// A document that could not be processed at all.
#[derive(Debug)]
pub struct DocumentFailure {
    pub document: String,
    pub error: ExtractError,
}

#[derive(Debug)]
pub struct ExtractionReport {
    pub dataset: Dataset,
    pub failures: Vec<DocumentFailure>,
    pub warnings: Vec<ExtractWarning>,
    pub page_count: usize,
}

impl ExtractionReport {
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.dataset.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

/// Runs every document through page extraction, in input order.
///
/// Documents that fail to load are reported in `failures` and skipped; the
/// remaining documents still run. `Err` is returned only for unusable options.
pub fn extract_documents<F>(
    inputs: &[DocumentInput],
    options: &ExtractOptions,
    mut on_progress: F,
) -> Result<ExtractionReport, ExtractError>
where
    F: FnMut(Progress<'_>),
{
    options.validate()?;
    let extractor = PageExtractor::new(options)?;

    let mut warnings = Vec::new();
    let mut failures = Vec::new();
    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input.load(options) {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!(document = %input.label, %error, "document could not be loaded");
                warnings.push(
                    ExtractWarning::new(WarningCode::DocumentFailed, error.to_string())
                        .with_document(&input.label),
                );
                failures.push(DocumentFailure {
                    document: input.label.clone(),
                    error,
                });
            }
        }
    }

    let total = documents.iter().map(|document| document.pages.len()).sum();
    let mut processed = 0;
    let mut dataset = Dataset::default();
    for document in &documents {
        for page in &document.pages {
            if let Some(record) = extractor.extract(&document.label, page, &mut warnings) {
                dataset.push(record);
            }
            processed += 1;
            info!(
                document = %document.label,
                page = page.page_number,
                processed,
                total,
                "page processed"
            );
            on_progress(Progress {
                processed,
                total,
                document: &document.label,
                page: page.page_number,
            });
        }
    }

    if dataset.is_empty() {
        warnings.push(ExtractWarning::new(
            WarningCode::NoRecords,
            "no product records were found in the supplied documents",
        ));
    }

    Ok(ExtractionReport {
        dataset,
        failures,
        warnings,
        page_count: total,
    })
}

pub fn extract_pdfs_to_file(
    input_pdfs: &[PathBuf],
    output: &Path,
    format: OutputFormat,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let inputs = input_pdfs
        .iter()
        .map(DocumentInput::from_path)
        .collect::<Vec<_>>();
    let report = extract_documents(&inputs, options, |_| {})?;
    match format {
        OutputFormat::Csv => write_csv(output, &report.dataset, options.delimiter)?,
        OutputFormat::Xlsx => write_xlsx(output, &report.dataset)?,
    }
    Ok(report)
}

pub fn extract_pdfs_to_csv(
    input_pdfs: &[PathBuf],
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    extract_pdfs_to_file(input_pdfs, output_csv, OutputFormat::Csv, options)
}

/// Serialises a dataset in memory. `delimiter` only applies to CSV.
pub fn render_dataset(
    dataset: &Dataset,
    format: OutputFormat,
    delimiter: u8,
) -> Result<Vec<u8>, ExtractError> {
    match format {
        OutputFormat::Csv => write_csv_to_string(dataset, delimiter).map(String::into_bytes),
        OutputFormat::Xlsx => write_xlsx_to_buffer(dataset),
    }
}
