//! Style-code anchor detection.
//!
//! Each strategy is an independent function over one page. [`locate_anchor`]
//! tries them in [`STRATEGIES`] order and keeps the first hit, so confidence
//! decreases down the list while recall increases.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::lines::text_lines;
use crate::model::{BBox, PageLayout, PositionedToken};
use crate::options::LayoutTolerances;
use crate::vocabulary::Vocabulary;

pub const STYLE_CODE_LEN: usize = 7;

static STYLE_PATTERN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bStyle\s*(?:#|No\.?|Item\s*#)?\s*[:：]?\s*([0-9]{1,7})(?:[^0-9]|$)")
        .expect("hardcoded style regex is valid")
});

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("hardcoded digit run regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    LabelProximity,
    TextPattern,
    GeometricScan,
    TextualScan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorPosition {
    Token(BBox),
    /// Byte offset of the match inside the page text.
    Text(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub code: String,
    pub strategy: AnchorStrategy,
    pub position: AnchorPosition,
}

pub struct AnchorContext<'a> {
    pub layout: &'a LayoutTolerances,
    pub vocabulary: &'a Vocabulary,
}

pub type Strategy = fn(&PageLayout, &AnchorContext<'_>) -> Option<Anchor>;

pub const STRATEGIES: &[Strategy] = &[
    label_proximity,
    text_pattern,
    geometric_scan,
    textual_scan,
];

#[must_use]
pub fn locate_anchor(page: &PageLayout, ctx: &AnchorContext<'_>) -> Option<Anchor> {
    let anchor = STRATEGIES.iter().find_map(|strategy| strategy(page, ctx))?;
    debug!(
        page = page.page_number,
        code = %anchor.code,
        strategy = ?anchor.strategy,
        "style anchor located"
    );
    Some(anchor)
}

impl Anchor {
    /// Token carrying the style code, if the page geometry has one.
    #[must_use]
    pub fn token_bbox(&self, page: &PageLayout) -> Option<BBox> {
        match self.position {
            AnchorPosition::Token(bbox) => Some(bbox),
            AnchorPosition::Text(_) => self.bound_token(page).map(|token| token.bbox),
        }
    }

    /// A text anchor binds only to a token holding the code as a complete
    /// digit run. Pattern matches also need a `Style` label on that token or
    /// to its left on the same line.
    fn bound_token<'p>(&self, page: &'p PageLayout) -> Option<&'p PositionedToken> {
        let tokens = reading_order(&page.tokens);
        let mut candidates = tokens
            .iter()
            .copied()
            .filter(|token| holds_code(&token.text, &self.code));

        if self.strategy != AnchorStrategy::TextPattern {
            return candidates.next();
        }

        let labels = tokens
            .iter()
            .filter(|token| is_style_label(&token.text))
            .collect::<Vec<_>>();
        candidates.find(|token| {
            is_style_label(&token.text)
                || labels.iter().any(|label| {
                    label.bbox.x0 < token.bbox.x0
                        && label.bbox.top < token.bbox.bottom
                        && token.bbox.top < label.bbox.bottom
                })
        })
    }

    /// Vertical split between the name region and the body regions.
    #[must_use]
    pub fn anchor_y(&self, page: &PageLayout) -> f64 {
        if let Some(bbox) = self.token_bbox(page) {
            return bbox.top;
        }

        let AnchorPosition::Text(offset) = self.position else {
            return 0.0;
        };
        let total = page.text.lines().count().max(1);
        let before = page
            .text
            .get(..offset)
            .map_or(0, |prefix| prefix.matches('\n').count());
        page.height * before as f64 / total as f64
    }
}

fn reading_order(tokens: &[PositionedToken]) -> Vec<&PositionedToken> {
    let mut sorted = tokens.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });
    sorted
}

fn below_header(bbox: &BBox, page: &PageLayout, layout: &LayoutTolerances) -> bool {
    bbox.top > page.height * layout.header_band
}

fn holds_code(text: &str, code: &str) -> bool {
    DIGIT_RUN_RE.find_iter(text).any(|run| run.as_str() == code)
}

fn is_style_label(text: &str) -> bool {
    text.trim_start_matches(|ch: char| ch.is_whitespace() || ch == '(')
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("style"))
}

fn is_style_code(text: &str) -> bool {
    text.len() == STYLE_CODE_LEN && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn label_proximity(page: &PageLayout, ctx: &AnchorContext<'_>) -> Option<Anchor> {
    let tokens = reading_order(&page.tokens);
    let label = tokens
        .iter()
        .find(|token| token.text.contains("Style") && below_header(&token.bbox, page, ctx.layout))?;

    let label_mid = label.bbox.mid_y();
    let mut same_line = tokens
        .iter()
        .filter(|token| {
            (token.bbox.mid_y() - label_mid).abs() <= ctx.layout.label_line_tolerance
                && token.bbox.x0 > label.bbox.x0
        })
        .collect::<Vec<_>>();
    same_line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

    same_line.into_iter().find_map(|token| {
        let code = token.text.trim().trim_matches(|ch| matches!(ch, '#' | ':' | '：'));
        is_style_code(code).then(|| Anchor {
            code: code.to_string(),
            strategy: AnchorStrategy::LabelProximity,
            position: AnchorPosition::Token(token.bbox),
        })
    })
}

/// `(Style#...)` marks an alternate-size cross reference and `KJ` prefixes an
/// internal annotation; neither names the page's own product.
fn is_secondary_reference(text: &str, match_start: usize) -> bool {
    let prefix = &text[..match_start];
    let line_prefix = prefix.rsplit('\n').next().unwrap_or(prefix);
    let open = line_prefix.rfind('(');
    let close = line_prefix.rfind(')');
    if open.is_some() && open > close {
        return true;
    }

    line_prefix
        .trim_end()
        .trim_end_matches([':', '-'])
        .trim_end()
        .to_ascii_uppercase()
        .ends_with("KJ")
}

fn text_pattern(page: &PageLayout, _ctx: &AnchorContext<'_>) -> Option<Anchor> {
    STYLE_PATTERN_RE.captures_iter(&page.text).find_map(|capture| {
        let whole = capture.get(0)?;
        let code = capture.get(1)?;
        if is_secondary_reference(&page.text, whole.start()) {
            return None;
        }
        Some(Anchor {
            code: code.as_str().to_string(),
            strategy: AnchorStrategy::TextPattern,
            position: AnchorPosition::Text(code.start()),
        })
    })
}

fn geometric_scan(page: &PageLayout, ctx: &AnchorContext<'_>) -> Option<Anchor> {
    reading_order(&page.tokens)
        .into_iter()
        .find(|token| {
            is_style_code(token.text.trim()) && below_header(&token.bbox, page, ctx.layout)
        })
        .map(|token| Anchor {
            code: token.text.trim().to_string(),
            strategy: AnchorStrategy::GeometricScan,
            position: AnchorPosition::Token(token.bbox),
        })
}

fn near_price_marker(
    text: &str,
    start: usize,
    end: usize,
    guard: usize,
    vocabulary: &Vocabulary,
) -> bool {
    let before = text[..start].chars().rev().take(guard).collect::<Vec<_>>();
    let before = before.into_iter().rev().collect::<String>();
    let after = text[end..].chars().take(guard).collect::<String>();

    [before, after]
        .iter()
        .any(|window| window.contains("MSRP") || vocabulary.has_currency_mark(window))
}

fn textual_scan(page: &PageLayout, ctx: &AnchorContext<'_>) -> Option<Anchor> {
    DIGIT_RUN_RE
        .find_iter(&page.text)
        .filter(|run| is_style_code(run.as_str()))
        .find(|run| {
            !near_price_marker(
                &page.text,
                run.start(),
                run.end(),
                ctx.layout.textual_guard_chars,
                ctx.vocabulary,
            )
        })
        .map(|run| Anchor {
            code: run.as_str().to_string(),
            strategy: AnchorStrategy::TextualScan,
            position: AnchorPosition::Text(run.start()),
        })
}

/// Index of the page-text line holding a text anchor.
pub(crate) fn anchor_text_line(page: &PageLayout, anchor: &Anchor) -> Option<usize> {
    let AnchorPosition::Text(offset) = anchor.position else {
        return None;
    };
    let line_start = page.text.get(..offset)?.rfind('\n').map_or(0, |index| index + 1);
    let line_end = page.text[offset..]
        .find('\n')
        .map_or(page.text.len(), |index| offset + index);
    let target = page.text[line_start..line_end].trim();
    let before = page.text[..line_start]
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();

    text_lines(&page.text)
        .get(before)
        .filter(|line| **line == target)
        .map(|_| before)
}
