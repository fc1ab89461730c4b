use catalog_to_csv::{ExtractWarning, ExtractionReport, ProductRecord};
use serde::Serialize;

pub const DEFAULT_DOWNLOAD_NAME: &str = "catalog-products";
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Ok,
    Empty,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentFailureSummary {
    pub document: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub status: ExtractionStatus,
    pub record_count: usize,
    pub page_count: usize,
    pub records: Vec<ProductRecord>,
    pub failures: Vec<DocumentFailureSummary>,
    pub warnings: Vec<ExtractWarning>,
}

impl From<&ExtractionReport> for ExtractionSummary {
    fn from(report: &ExtractionReport) -> Self {
        Self {
            status: if report.is_empty() {
                ExtractionStatus::Empty
            } else {
                ExtractionStatus::Ok
            },
            record_count: report.record_count(),
            page_count: report.page_count,
            records: report.dataset.records().to_vec(),
            failures: report
                .failures
                .iter()
                .map(|failure| DocumentFailureSummary {
                    document: failure.document.clone(),
                    message: failure.error.to_string(),
                })
                .collect(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
