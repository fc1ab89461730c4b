use std::collections::HashMap;

use catalog_csv_worker::csv_pipeline::upload_label;
use catalog_csv_worker::error::ApiError;
use catalog_csv_worker::models::{ExtractionStatus, ExtractionSummary};
use catalog_csv_worker::routes::{
    ResponseFormat, download_file_name, parse_format_query, parse_options_query,
};
use catalog_to_csv::{DocumentInput, ExtractOptions, OutputFormat, extract_documents};
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[test]
fn format_defaults_to_csv_and_rejects_unknown_values() {
    assert_eq!(
        parse_format_query(&query(&[])).expect("default format"),
        ResponseFormat::Csv
    );
    assert_eq!(
        parse_format_query(&query(&[("format", "JSON")])).expect("json format"),
        ResponseFormat::Json
    );

    let err = parse_format_query(&query(&[("format", "pdf")])).expect_err("pdf is not served");
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn xlsx_format_downloads_a_workbook() {
    let format = parse_format_query(&query(&[("format", "xlsx")])).expect("xlsx format");
    assert_eq!(format, ResponseFormat::Xlsx);
    assert_eq!(format.output_format(), Some(OutputFormat::Xlsx));
    assert_eq!(ResponseFormat::Json.output_format(), None);
    assert_eq!(
        OutputFormat::Xlsx.content_type(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn pages_query_becomes_page_selection() {
    let options = parse_options_query(&query(&[("pages", "2-3")])).expect("pages should parse");
    let pages = options.pages.expect("selection present");
    assert!(pages.contains(2));
    assert!(!pages.contains(1));

    let err = parse_options_query(&query(&[("pages", "0")])).expect_err("page 0 is invalid");
    assert_eq!(err.code(), "bad_request");
}

#[test]
fn unbounded_page_range_is_a_bad_request() {
    let err = parse_options_query(&query(&[("pages", "1-4294967295")]))
        .expect_err("range is too large");
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn download_name_carries_export_date_and_safe_stem() {
    let now: DateTime<Utc> = "2026-03-05T10:00:00Z".parse().expect("valid datetime");

    assert_eq!(
        download_file_name("catalog-products", OutputFormat::Csv, now),
        "catalog-products-20260305.csv"
    );
    assert_eq!(
        download_file_name("FW25 \"Products\"", OutputFormat::Csv, now),
        "FW25-Products-20260305.csv"
    );
    assert_eq!(
        download_file_name("  ", OutputFormat::Xlsx, now),
        "catalog-products-20260305.xlsx"
    );
}

#[test]
fn unnamed_uploads_get_positional_labels() {
    assert_eq!(upload_label("fw25.pdf", 0), "fw25.pdf");
    assert_eq!(upload_label("", 1), "upload-2.pdf");
}

#[test]
fn empty_run_summarises_as_empty_status() {
    let inputs = vec![DocumentInput::from_bytes("broken.pdf", b"not a pdf".to_vec())];
    let report = extract_documents(&inputs, &ExtractOptions::default(), |_| {})
        .expect("options are valid");

    let summary = ExtractionSummary::from(&report);
    assert_eq!(summary.status, ExtractionStatus::Empty);
    assert_eq!(summary.record_count, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].document, "broken.pdf");

    let json = serde_json::to_value(&summary).expect("summary serialises");
    assert_eq!(json["status"], "empty");
    assert_eq!(json["warnings"][0]["code"], "document_failed");
    assert_eq!(json["warnings"][1]["code"], "no_records");
}
