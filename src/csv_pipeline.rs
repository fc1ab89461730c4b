use catalog_to_csv::{DocumentInput, ExtractOptions, ExtractionReport, extract_documents};

use crate::error::ApiError;

/// Label for the `index`-th upload; unnamed parts get a positional name.
pub fn upload_label(file_name: &str, index: usize) -> String {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        format!("upload-{}.pdf", index + 1)
    } else {
        trimmed.to_string()
    }
}

pub fn convert_uploads(
    uploads: &[DocumentInput],
    options: &ExtractOptions,
) -> Result<ExtractionReport, ApiError> {
    let report = extract_documents(uploads, options, |progress| {
        worker::console_log!(
            "extraction progress: {:.0}% ({}/{}) {} page {}",
            progress.fraction() * 100.0,
            progress.processed,
            progress.total,
            progress.document,
            progress.page
        );
    })?;

    for failure in &report.failures {
        worker::console_error!("document {} failed: {}", failure.document, failure.error);
    }
    if !uploads.is_empty() && report.failures.len() == uploads.len() {
        return Err(ApiError::Validation(
            "none of the uploaded documents could be read as PDF".to_string(),
        ));
    }

    worker::console_log!(
        "catalog extraction completed: records={}, pages={}, failures={}",
        report.record_count(),
        report.page_count,
        report.failures.len()
    );

    Ok(report)
}
