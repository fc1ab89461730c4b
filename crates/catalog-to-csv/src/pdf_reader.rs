use std::collections::BTreeMap;

use encoding_rs::{BIG5, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::error::ExtractError;
use crate::lines::render_text;
use crate::model::{BBox, CatalogDocument, PageLayout, PositionedToken};
use crate::options::PageSelection;

const DEFAULT_PAGE_SIZE: (f64, f64) = (595.0, 842.0);
const ASCENT: f64 = 0.8;
const DESCENT: f64 = 0.2;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if bytes.starts_with(&[0xFE, 0xFF]) || bytes.starts_with(&[0xFF, 0xFE]) {
        let bytes = if bytes.len() > 2 { &bytes[2..] } else { bytes };
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if let Some(name) = encoding {
        let lower = name.to_ascii_lowercase();

        if lower.contains("utf16")
            || lower.contains("ucs2")
            || lower.contains("identity-h")
            || lower.contains("unicode")
        {
            let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
            if !had_errors && !utf16.is_empty() {
                return utf16.into_owned();
            }
        }

        if lower.contains("big5") || lower.contains("b5") || lower.contains("eten") {
            let (big5, _, had_errors) = BIG5.decode(bytes);
            if !had_errors && !big5.is_empty() {
                return big5.into_owned();
            }
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

/// Prefers texts that carry style-code evidence; ties go to the last
/// candidate.
fn text_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let non_empty_lines = text.lines().filter(|line| !line.trim().is_empty()).count();
    let non_empty_lines = i64::try_from(non_empty_lines).unwrap_or(i64::MAX / 4);
    let style_bonus = if text.contains("Style") { 200 } else { 0 };
    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    non_empty_lines + style_bonus - broken_penalty
}

fn choose_best_text(candidates: Vec<String>) -> String {
    candidates
        .into_iter()
        .max_by_key(|text| text_quality_score(text))
        .unwrap_or_default()
}

#[allow(clippy::cast_precision_loss)]
fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Width and height from the page's own or inherited `MediaBox`.
fn page_size(document: &Document, page_id: ObjectId) -> (f64, f64) {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dictionary) = document.get_dictionary(id) else {
            break;
        };
        if let Some(values) = dictionary
            .get(b"MediaBox")
            .ok()
            .and_then(|object| resolve(document, object))
            .and_then(|object| object.as_array().ok())
        {
            let values = values.iter().filter_map(number).collect::<Vec<_>>();
            if let [x0, y0, x1, y1] = values[..] {
                return ((x1 - x0).abs(), (y1 - y0).abs());
            }
        }
        current = dictionary
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok();
    }
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f64, ty: f64) -> Matrix {
        Matrix {
            e: tx,
            f: ty,
            ..Matrix::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        let values = operands.iter().filter_map(number).collect::<Vec<_>>();
        let [a, b, c, d, e, f] = values[..] else {
            return None;
        };
        Some(Matrix { a, b, c, d, e, f })
    }

    /// `self × other` in PDF row-vector convention.
    fn then(self, other: Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn vertical_scale(&self) -> f64 {
        self.b.hypot(self.d)
    }
}

#[derive(Debug, Clone, Copy)]
struct FontInfo<'a> {
    encoding: Option<&'a str>,
    /// Average glyph advance in em.
    advance: f64,
}

fn page_fonts(document: &Document, page_id: ObjectId) -> BTreeMap<Vec<u8>, FontInfo<'_>> {
    document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| {
            let base_font = font
                .get(b"BaseFont")
                .and_then(Object::as_name)
                .map(|name| String::from_utf8_lossy(name).to_ascii_lowercase())
                .unwrap_or_default();
            let advance = if base_font.contains("courier") { 0.6 } else { 0.5 };
            (
                name,
                FontInfo {
                    encoding: Some(font.get_font_encoding()),
                    advance,
                },
            )
        })
        .collect()
}

/// Text-state walker that turns shown strings into word tokens.
struct TokenCollector {
    page_height: f64,
    line_matrix: Matrix,
    text_matrix: Matrix,
    font_size: f64,
    leading: f64,
    tokens: Vec<PositionedToken>,
    word: String,
    word_start: Option<(f64, f64, f64)>,
}

impl TokenCollector {
    fn new(page_height: f64) -> Self {
        Self {
            page_height,
            line_matrix: Matrix::IDENTITY,
            text_matrix: Matrix::IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            tokens: Vec::new(),
            word: String::new(),
            word_start: None,
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.flush();
        self.line_matrix = Matrix::translation(tx, ty).then(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn set_matrix(&mut self, matrix: Matrix) {
        self.flush();
        self.line_matrix = matrix;
        self.text_matrix = matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn advance(&mut self, text_space_dx: f64) {
        self.text_matrix = Matrix::translation(text_space_dx, 0.0).then(self.text_matrix);
    }

    fn show(&mut self, text: &str, font: FontInfo<'_>) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.flush();
            } else {
                if self.word_start.is_none() {
                    let size = self.font_size * self.text_matrix.vertical_scale();
                    self.word_start = Some((self.text_matrix.e, self.text_matrix.f, size));
                }
                self.word.push(ch);
            }
            self.advance(font.advance * self.font_size);
        }
    }

    fn flush(&mut self) {
        let Some((x0, baseline, size)) = self.word_start.take() else {
            self.word.clear();
            return;
        };
        let text = std::mem::take(&mut self.word);
        if text.is_empty() {
            return;
        }
        let x1 = self.text_matrix.e.max(x0);
        self.tokens.push(PositionedToken::new(
            text,
            BBox::new(
                x0,
                self.page_height - (baseline + size * ASCENT),
                x1,
                self.page_height - (baseline - size * DESCENT),
            ),
        ));
    }
}

fn collect_shown(
    collector: &mut TokenCollector,
    font: FontInfo<'_>,
    operands: &[Object],
) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                collector.show(&decode_pdf_bytes(font.encoding, bytes), font);
            }
            Object::Array(items) => collect_shown(collector, font, items),
            other => {
                if let Some(adjustment) = number(other) {
                    if adjustment < -100.0 {
                        collector.flush();
                    }
                    collector.advance(-adjustment / 1000.0 * collector.font_size);
                }
            }
        }
    }
}

fn extract_page_tokens(
    document: &Document,
    page_id: ObjectId,
    page_height: f64,
) -> Option<Vec<PositionedToken>> {
    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let fonts = page_fonts(document, page_id);
    let fallback_font = FontInfo {
        encoding: None,
        advance: 0.5,
    };

    let mut collector = TokenCollector::new(page_height);
    let mut font = fallback_font;
    for operation in content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => collector.set_matrix(Matrix::IDENTITY),
            "ET" => collector.flush(),
            "Tf" => {
                font = operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| fonts.get(name).copied())
                    .unwrap_or(fallback_font);
                if let Some(size) = operands.get(1).and_then(number) {
                    collector.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    collector.leading = leading;
                }
            }
            "Td" | "TD" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                if operation.operator == "TD" {
                    collector.leading = -ty;
                }
                collector.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    collector.set_matrix(matrix);
                }
            }
            "T*" => collector.next_line(),
            "Tj" | "TJ" => collect_shown(&mut collector, font, operands),
            "'" => {
                collector.next_line();
                collect_shown(&mut collector, font, operands);
            }
            "\"" => {
                collector.next_line();
                collect_shown(&mut collector, font, operands.get(2..).unwrap_or_default());
            }
            _ => {}
        }
    }
    collector.flush();

    Some(collector.tokens)
}

/// Loads a PDF into positioned pages. `label` names the document in records.
pub fn read_catalog_document(
    label: &str,
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
    line_tolerance: f64,
) -> Result<CatalogDocument, ExtractError> {
    let document = Document::load_mem(input_pdf)?;
    let pages_map = document.get_pages();

    let pdf_extract_pages = pdf_extract::extract_text_from_mem(input_pdf)
        .ok()
        .map(|text| split_text_into_pages(&text))
        .filter(|pages| pages.len() == pages_map.len());

    let mut pages = Vec::new();
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        if let Some(selection) = page_selection {
            if !selection.contains(*page_no) {
                continue;
            }
        }

        let (width, height) = page_size(&document, *page_id);
        let tokens = extract_page_tokens(&document, *page_id, height).unwrap_or_default();

        let mut candidates = Vec::new();
        if let Some(text) = pdf_extract_pages
            .as_ref()
            .and_then(|fallback| fallback.get(index).cloned())
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }
        if let Some(text) = document
            .extract_text(&[*page_no])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }
        candidates.push(render_text(&tokens, line_tolerance));

        pages.push(PageLayout {
            page_number: *page_no,
            width,
            height,
            tokens,
            text: choose_best_text(candidates),
        });
    }

    if pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }

    Ok(CatalogDocument {
        label: label.to_string(),
        pages,
    })
}
