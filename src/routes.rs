use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use catalog_to_csv::{DocumentInput, ExtractOptions, OutputFormat, PageSelection, render_dataset};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use worker::{Context, Env, FormEntry, Request, Response, Result, RouteContext, Router};

use crate::csv_pipeline::{self, upload_label};
use crate::error::ApiError;
use crate::models::{DEFAULT_DOWNLOAD_NAME, ExtractionSummary, UPLOAD_FIELD};

static UNSAFE_FILE_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]+").expect("hardcoded file name regex is valid")
});

#[derive(Debug, Clone)]
pub struct AppState {
    pub download_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Csv,
    Json,
    Xlsx,
}

impl ResponseFormat {
    /// File format of the download; `None` for the JSON summary.
    #[must_use]
    pub fn output_format(self) -> Option<OutputFormat> {
        match self {
            Self::Csv => Some(OutputFormat::Csv),
            Self::Xlsx => Some(OutputFormat::Xlsx),
            Self::Json => None,
        }
    }
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let download_name = env
        .var("DOWNLOAD_NAME")
        .map(|value| value.to_string())
        .unwrap_or_else(|_| DEFAULT_DOWNLOAD_NAME.to_string());

    let state = AppState { download_name };

    Router::with_data(state)
        .post_async("/api/v1/extract", extract_route)
        .run(req, env)
        .await
}

async fn extract_route(mut req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match extract_response(&mut req, &ctx.data.download_name).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn extract_response(req: &mut Request, download_name: &str) -> Result<Response, ApiError> {
    let query = parse_query(req)?;
    let format = parse_format_query(&query)?;
    let options = parse_options_query(&query)?;
    let uploads = read_uploads(req).await?;

    let report = csv_pipeline::convert_uploads(&uploads, &options)?;

    // An empty run is a result of its own, never an empty download.
    let output = match format.output_format() {
        Some(output) if !report.is_empty() => output,
        _ => return Ok(json_response(&ExtractionSummary::from(&report))?),
    };

    let body = render_dataset(&report.dataset, output, options.delimiter)?;
    let mut response = Response::from_bytes(body)?;
    response
        .headers_mut()
        .set("Content-Type", output.content_type())?;
    response.headers_mut().set(
        "Content-Disposition",
        &format!(
            "attachment; filename=\"{}\"",
            download_file_name(download_name, output, Utc::now())
        ),
    )?;
    response
        .headers_mut()
        .set("X-Record-Count", &report.record_count().to_string())?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

async fn read_uploads(req: &mut Request) -> Result<Vec<DocumentInput>, ApiError> {
    let form = req.form_data().await?;
    let entries = form.get_all(UPLOAD_FIELD).unwrap_or_default();

    let mut uploads = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match entry {
            FormEntry::File(file) => {
                let label = upload_label(&file.name(), index);
                let bytes = file.bytes().await?;
                uploads.push(DocumentInput::from_bytes(label, bytes));
            }
            FormEntry::Field(_) => {
                return Err(ApiError::BadRequest(format!(
                    "form field '{UPLOAD_FIELD}' must carry a file"
                )));
            }
        }
    }

    if uploads.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "upload at least one PDF in the '{UPLOAD_FIELD}' form field"
        )));
    }
    Ok(uploads)
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    let mut response = Response::from_json(payload)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn parse_query(req: &Request) -> Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

pub fn parse_format_query(query: &HashMap<String, String>) -> Result<ResponseFormat, ApiError> {
    let Some(raw) = query.get("format") else {
        return Ok(ResponseFormat::Csv);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "csv" => Ok(ResponseFormat::Csv),
        "json" => Ok(ResponseFormat::Json),
        "xlsx" => Ok(ResponseFormat::Xlsx),
        other => Err(ApiError::BadRequest(format!(
            "format must be csv, xlsx or json, got '{other}'"
        ))),
    }
}

pub fn parse_options_query(query: &HashMap<String, String>) -> Result<ExtractOptions, ApiError> {
    let pages = query
        .get("pages")
        .map(|raw| PageSelection::from_str(raw))
        .transpose()
        .map_err(|error| ApiError::BadRequest(format!("invalid page selection: {error}")))?;

    Ok(ExtractOptions {
        pages,
        ..ExtractOptions::default()
    })
}

/// `<stem>-<yyyymmdd>.<ext>`, with the stem reduced to header-safe characters.
pub fn download_file_name(stem: &str, format: OutputFormat, now: DateTime<Utc>) -> String {
    let sanitized = UNSAFE_FILE_CHARS_RE.replace_all(stem.trim(), "-");
    let sanitized = sanitized.trim_matches('-');
    let stem = if sanitized.is_empty() {
        DEFAULT_DOWNLOAD_NAME
    } else {
        sanitized
    };
    format!("{stem}-{}.{}", now.format("%Y%m%d"), format.extension())
}
