//! Carves a page into name, description and features/material regions
//! around the style anchor.

use crate::anchor::{Anchor, anchor_text_line};
use crate::error::ExtractError;
use crate::fields::{NoiseFilter, is_color_code_line, is_two_letter_code};
use crate::lines::{text_lines, tokens_to_lines};
use crate::model::{BBox, Line, PageLayout};
use crate::options::LayoutTolerances;
use crate::vocabulary::Vocabulary;

pub struct RegionContext<'a> {
    pub layout: &'a LayoutTolerances,
    pub vocabulary: &'a Vocabulary,
    pub noise: &'a NoiseFilter,
}

/// Bounding boxes of the optional section labels below the anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectionLabels {
    pub features: Option<BBox>,
    pub materials: Option<BBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentColumns {
    pub features: String,
    pub material: String,
}

fn join_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text left of `Style` on the anchor's own line.
fn name_from_anchor_line(line: &str) -> Option<String> {
    let (left, _) = line.split_once("Style")?;
    let left = left.trim();
    (left.chars().count() > 3).then(|| left.to_string())
}

pub fn extract_name(
    page: &PageLayout,
    anchor: &Anchor,
    anchor_y: f64,
    ctx: &RegionContext<'_>,
) -> Result<String, ExtractError> {
    if anchor.token_bbox(page).is_none() {
        return Ok(extract_name_from_text(page, anchor, ctx.noise));
    }

    let tolerance = ctx.layout.line_tolerance;
    let region = page.crop(BBox::new(0.0, 0.0, page.width, anchor_y + tolerance), tolerance)?;
    let lines = tokens_to_lines(&region.tokens, tolerance);

    if let Some(line) = lines
        .iter()
        .rev()
        .find(|line| !ctx.noise.is_name_noise(&line.text, &anchor.code))
    {
        return Ok(line.text.clone());
    }

    Ok(lines
        .iter()
        .rev()
        .find(|line| line.text.contains(&anchor.code))
        .and_then(|line| name_from_anchor_line(&line.text))
        .unwrap_or_default())
}

/// Nearest usable line above the anchor in the flattened page text.
fn extract_name_from_text(page: &PageLayout, anchor: &Anchor, noise: &NoiseFilter) -> String {
    let lines = text_lines(&page.text);
    let Some(index) = anchor_text_line(page, anchor) else {
        return String::new();
    };

    lines[..index]
        .iter()
        .rev()
        .find(|line| !noise.is_name_noise(line, &anchor.code))
        .map(|line| (*line).to_string())
        .or_else(|| name_from_anchor_line(lines[index]))
        .unwrap_or_default()
}

#[must_use]
pub fn find_section_labels(
    page: &PageLayout,
    body_top: f64,
    vocabulary: &Vocabulary,
) -> SectionLabels {
    let mut below = page
        .tokens
        .iter()
        .filter(|token| token.bbox.top >= body_top)
        .collect::<Vec<_>>();
    below.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    SectionLabels {
        features: below
            .iter()
            .find(|token| vocabulary.is_features_label(&token.text))
            .map(|token| token.bbox),
        materials: below
            .iter()
            .find(|token| vocabulary.is_materials_label(&token.text))
            .map(|token| token.bbox),
    }
}

fn description_bottom(page: &PageLayout, labels: &SectionLabels) -> f64 {
    labels.features.map_or(page.height / 2.0, |bbox| bbox.top)
}

pub fn extract_description(
    page: &PageLayout,
    anchor_y: f64,
    labels: &SectionLabels,
    ctx: &RegionContext<'_>,
) -> Result<String, ExtractError> {
    let tolerance = ctx.layout.line_tolerance;
    let region = page.crop(
        BBox::new(
            0.0,
            anchor_y + ctx.layout.anchor_offset,
            page.width,
            description_bottom(page, labels),
        ),
        tolerance,
    )?;

    let lines = tokens_to_lines(&region.tokens, tolerance);
    Ok(join_lines(
        lines
            .iter()
            .map(|line| line.text.as_str())
            .filter(|line| {
                (ctx.vocabulary.starts_with_bullet(line)
                    || line.chars().count() > ctx.layout.min_description_chars)
                    && !ctx.noise.is_boilerplate(line)
            }),
    ))
}

/// Top edge of the first stop-keyword token at or below `from`.
fn stop_line(page: &PageLayout, from: f64, vocabulary: &Vocabulary) -> f64 {
    page.tokens
        .iter()
        .filter(|token| token.bbox.top >= from && vocabulary.is_stop_token(&token.text))
        .map(|token| token.bbox.top)
        .min_by(f64::total_cmp)
        .unwrap_or(page.height)
}

fn keep_column_line(line: &str) -> bool {
    !is_color_code_line(line) && !is_two_letter_code(line)
}

fn features_text(lines: &[Line]) -> String {
    join_lines(
        lines
            .iter()
            .map(|line| line.text.as_str())
            .filter(|line| keep_column_line(line)),
    )
}

/// Size legends close the material column for good.
fn material_text(lines: &[Line], vocabulary: &Vocabulary) -> String {
    join_lines(
        lines
            .iter()
            .map(|line| line.text.as_str())
            .take_while(|line| {
                !line
                    .split_whitespace()
                    .any(|word| vocabulary.is_stop_token(word))
            })
            .filter(|line| keep_column_line(line)),
    )
}

fn section_lines(
    page: &PageLayout,
    top: f64,
    bottom: f64,
    tolerance: f64,
) -> Result<Vec<Line>, ExtractError> {
    let region = page.crop(BBox::new(0.0, top, page.width, bottom), tolerance)?;
    Ok(tokens_to_lines(&region.tokens, tolerance))
}

pub fn extract_columns(
    page: &PageLayout,
    body_top: f64,
    labels: &SectionLabels,
    ctx: &RegionContext<'_>,
) -> Result<ContentColumns, ExtractError> {
    let tolerance = ctx.layout.line_tolerance;

    if let (Some(features), Some(materials)) = (labels.features, labels.materials) {
        if (features.mid_y() - materials.mid_y()).abs() > ctx.layout.label_line_tolerance {
            return extract_stacked_columns(page, features, materials, ctx);
        }
    }

    let top = match (labels.features, labels.materials) {
        (None, None) => description_bottom(page, labels).max(body_top),
        (features, materials) => features
            .into_iter()
            .chain(materials)
            .map(|bbox| bbox.bottom)
            .fold(f64::MIN, f64::max),
    };
    let bottom = stop_line(page, top, ctx.vocabulary);
    let split_x = labels
        .materials
        .map_or(page.width / 2.0, |bbox| bbox.x0 - ctx.layout.split_margin);

    let region = page.crop(BBox::new(0.0, top, page.width, bottom), tolerance)?;
    let (left, right): (Vec<_>, Vec<_>) = region
        .tokens
        .into_iter()
        .partition(|token| token.bbox.x0 < split_x);

    Ok(ContentColumns {
        features: features_text(&tokens_to_lines(&left, tolerance)),
        material: material_text(&tokens_to_lines(&right, tolerance), ctx.vocabulary),
    })
}

/// Labels printed one above the other: each section runs down to the next
/// label, the lower one down to the stop line.
fn extract_stacked_columns(
    page: &PageLayout,
    features: BBox,
    materials: BBox,
    ctx: &RegionContext<'_>,
) -> Result<ContentColumns, ExtractError> {
    let tolerance = ctx.layout.line_tolerance;
    let (upper, lower) = if features.top < materials.top {
        (features, materials)
    } else {
        (materials, features)
    };

    let upper_lines = section_lines(page, upper.bottom, lower.top, tolerance)?;
    let lower_bottom = stop_line(page, lower.bottom, ctx.vocabulary);
    let lower_lines = section_lines(page, lower.bottom, lower_bottom, tolerance)?;

    let (features_lines, material_lines) = if upper == features {
        (upper_lines, lower_lines)
    } else {
        (lower_lines, upper_lines)
    };

    Ok(ContentColumns {
        features: features_text(&features_lines),
        material: material_text(&material_lines, ctx.vocabulary),
    })
}
