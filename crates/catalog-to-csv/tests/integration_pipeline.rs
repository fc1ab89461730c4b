mod common;

use std::io::{Cursor, Read};
use std::process::Command;

use catalog_to_csv::{
    DocumentInput, ExtractOptions, ExtractWarningCode, OutputFormat, PageSelection,
    extract_documents, extract_pdfs_to_csv, extract_pdfs_to_file,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use zip::ZipArchive;

fn workbook_part(bytes: Vec<u8>, name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("workbook is a zip archive");
    let mut entry = archive.by_name(name).expect("workbook part should exist");
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .expect("workbook part is utf-8");
    content
}

#[test]
fn extracts_catalog_page_end_to_end() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("fw25.pdf");
    let output = dir.path().join("fw25.csv");

    common::create_test_pdf(
        &input,
        &[common::catalog_page("Alpine Down Jacket", "Style# 1101002")],
    )
    .expect("PDF fixture should be created");

    let report = extract_pdfs_to_csv(&[input], &output, &ExtractOptions::default())
        .expect("extraction should succeed");

    assert_eq!(report.record_count(), 1, "report: {report:?}");
    let record = &report.dataset.records()[0];
    assert_eq!(record.source_file, "fw25.pdf");
    assert_eq!(record.page, 1);
    assert_eq!(record.category, "INSULATION");
    assert_eq!(record.product_name, "Alpine Down Jacket");
    assert_eq!(record.style_code, "1101002");
    assert_eq!(record.msrp, "35000");
    assert_eq!(record.weight, "380");
    assert!(record.features.contains("Warm"), "record: {record:?}");
    assert!(record.material.contains("50D Nylon"), "record: {record:?}");
    assert!(!record.features.contains("Nylon"), "record: {record:?}");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert!(
        csv.starts_with(
            "Source File,Page,Category,Product Name,Style#,MSRP,Weight (g),Features,Material,Description"
        ),
        "unexpected CSV output: {csv:?}"
    );
    assert!(
        csv.contains("fw25.pdf,1,INSULATION,Alpine Down Jacket,1101002,35000,380"),
        "unexpected CSV output: {csv:?}"
    );
}

#[test]
fn keeps_document_order_and_source_labels() {
    let first = common::create_test_pdf_bytes(&[
        common::catalog_page("Summit Parka", "Style# 1102222"),
        common::lookbook_page(),
        common::catalog_page("Trail Pants", "Style# 1105555"),
    ])
    .expect("PDF fixture should be created");
    let second = common::create_test_pdf_bytes(&[common::catalog_page(
        "Alpine Down Jacket",
        "Style# 1101002",
    )])
    .expect("PDF fixture should be created");

    let inputs = vec![
        DocumentInput::from_bytes("b-catalog.pdf", first),
        DocumentInput::from_bytes("a-catalog.pdf", second),
    ];
    let mut fractions = Vec::new();
    let report = extract_documents(&inputs, &ExtractOptions::default(), |progress| {
        fractions.push((progress.processed, progress.total, progress.fraction()));
    })
    .expect("extraction should succeed");

    let keys = report
        .dataset
        .records()
        .iter()
        .map(|record| (record.source_file.as_str(), record.page, record.style_code.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec![
            ("b-catalog.pdf", 1, "1102222"),
            ("b-catalog.pdf", 3, "1105555"),
            ("a-catalog.pdf", 1, "1101002"),
        ]
    );
    assert_eq!(report.page_count, 4);
    assert_eq!(fractions.len(), 4);
    assert_eq!(fractions.last().map(|entry| entry.2), Some(1.0));
    assert!(report.failures.is_empty());
}

#[test]
fn rerunning_yields_identical_dataset() {
    let bytes = common::create_test_pdf_bytes(&[
        common::catalog_page("Summit Parka", "Style# 1102222"),
        common::catalog_page("Trail Pants", "Style# 1105555"),
    ])
    .expect("PDF fixture should be created");
    let inputs = vec![DocumentInput::from_bytes("ss26.pdf", bytes)];

    let first = extract_documents(&inputs, &ExtractOptions::default(), |_| {})
        .expect("extraction should succeed");
    let second = extract_documents(&inputs, &ExtractOptions::default(), |_| {})
        .expect("extraction should succeed");

    assert_eq!(first.dataset, second.dataset);
    assert_eq!(first.record_count(), 2);
}

#[test]
fn page_selection_limits_processed_pages() {
    let bytes = common::create_test_pdf_bytes(&[
        common::catalog_page("Summit Parka", "Style# 1102222"),
        common::catalog_page("Trail Pants", "Style# 1105555"),
    ])
    .expect("PDF fixture should be created");
    let options = ExtractOptions {
        pages: Some("2".parse::<PageSelection>().expect("selection should parse")),
        ..ExtractOptions::default()
    };

    let inputs = [DocumentInput::from_bytes("ss26.pdf", bytes)];
    let report =
        extract_documents(&inputs, &options, |_| {}).expect("extraction should succeed");

    assert_eq!(report.page_count, 1);
    assert_eq!(report.dataset.records()[0].product_name, "Trail Pants");
}

#[test]
fn corrupt_document_does_not_stop_the_run() {
    let good = common::create_test_pdf_bytes(&[common::catalog_page(
        "Alpine Down Jacket",
        "Style# 1101002",
    )])
    .expect("PDF fixture should be created");
    let inputs = vec![
        DocumentInput::from_bytes("corrupt.pdf", b"%PDF-1.5 truncated".to_vec()),
        DocumentInput::from_bytes("good.pdf", good),
    ];

    let report = extract_documents(&inputs, &ExtractOptions::default(), |_| {})
        .expect("extraction should succeed");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].document, "corrupt.pdf");
    assert_eq!(report.record_count(), 1);
    assert_eq!(report.dataset.records()[0].source_file, "good.pdf");
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.code == ExtractWarningCode::DocumentFailed)
    );
}

#[test]
fn pages_without_style_code_produce_no_records() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("lookbook.pdf");
    let output = dir.path().join("lookbook.csv");

    common::create_test_pdf(&input, &[common::lookbook_page()])
        .expect("PDF fixture should be created");

    let report = extract_pdfs_to_csv(&[input], &output, &ExtractOptions::default())
        .expect("extraction should succeed");

    assert!(report.is_empty());
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.code == ExtractWarningCode::NoRecords)
    );
    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn cli_exits_with_code_2_when_no_records() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("cli-empty.pdf");
    let output = dir.path().join("cli-empty.csv");

    common::create_test_pdf(&input, &[common::lookbook_page()])
        .expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_catalog2csv"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_reads_several_inputs() {
    let dir = tempdir().expect("tempdir should be created");
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    let output = dir.path().join("both.csv");

    common::create_test_pdf(&first, &[common::catalog_page("Summit Parka", "Style# 1102222")])
        .expect("PDF fixture should be created");
    common::create_test_pdf(&second, &[common::catalog_page("Trail Pants", "Style# 1105555")])
        .expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_catalog2csv"))
        .args([
            "extract",
            "-i",
            &first.to_string_lossy(),
            "-i",
            &second.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    let sources = csv
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect::<Vec<_>>();
    assert_eq!(sources, vec!["first.pdf", "second.pdf"]);
}

#[test]
fn cli_fails_when_every_input_is_unreadable() {
    let dir = tempdir().expect("tempdir should be created");
    let output = dir.path().join("missing.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_catalog2csv"))
        .args([
            "extract",
            "-i",
            &dir.path().join("missing.pdf").to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(1));
}

#[test]
fn writes_xlsx_workbook_with_products_sheet() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("fw25.pdf");
    let output = dir.path().join("fw25.xlsx");

    common::create_test_pdf(
        &input,
        &[common::catalog_page("Alpine Down Jacket", "Style# 1101002")],
    )
    .expect("PDF fixture should be created");

    let report = extract_pdfs_to_file(
        &[input],
        &output,
        OutputFormat::Xlsx,
        &ExtractOptions::default(),
    )
    .expect("extraction should succeed");
    assert_eq!(report.record_count(), 1);

    let bytes = std::fs::read(&output).expect("workbook should be readable");
    let workbook = workbook_part(bytes.clone(), "xl/workbook.xml");
    assert!(workbook.contains(r#"name="Products""#), "{workbook}");
    let strings = workbook_part(bytes, "xl/sharedStrings.xml");
    assert!(strings.contains("Alpine Down Jacket"), "{strings}");
    assert!(strings.contains("1101002"), "{strings}");
}

#[test]
fn cli_xlsx_flag_overrides_output_extension() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("flag.pdf");
    let output = dir.path().join("flag.out");

    common::create_test_pdf(&input, &[common::catalog_page("Trail Pants", "Style# 1105555")])
        .expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_catalog2csv"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
            "--xlsx",
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let bytes = std::fs::read(&output).expect("workbook should be readable");
    assert!(bytes.starts_with(b"PK"), "output is not a zip archive");
    let strings = workbook_part(bytes, "xl/sharedStrings.xml");
    assert!(strings.contains("Trail Pants"), "{strings}");
}
