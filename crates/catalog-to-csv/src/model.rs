use serde::Serialize;

use crate::error::ExtractError;
use crate::lines::render_text;

/// Bounding box with a top-left origin: `top`/`bottom` are distances from
/// the top edge of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    #[must_use]
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    #[must_use]
    pub fn mid_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    #[must_use]
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    fn is_degenerate(&self) -> bool {
        [self.x0, self.top, self.x1, self.bottom]
            .iter()
            .any(|value| !value.is_finite())
            || self.x1 < self.x0
            || self.bottom < self.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    pub text: String,
    pub bbox: BBox,
}

impl PositionedToken {
    #[must_use]
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Tokens sharing a vertical position, joined left-to-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub bbox: BBox,
}

/// One catalog page as handed over by the document layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_number: u32,
    pub width: f64,
    pub height: f64,
    pub tokens: Vec<PositionedToken>,
    pub text: String,
}

impl PageLayout {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Restricts the page to `region`. A token belongs to the region when its
    /// top-left corner lies inside the half-open rectangle.
    pub fn crop(&self, region: BBox, line_tolerance: f64) -> Result<PageLayout, ExtractError> {
        if region.is_degenerate() || region.top > self.height || region.x0 > self.width {
            return Err(ExtractError::InvalidRegion {
                page: self.page_number,
                x0: region.x0,
                top: region.top,
                x1: region.x1,
                bottom: region.bottom,
            });
        }

        let tokens = self
            .tokens
            .iter()
            .filter(|token| {
                token.bbox.top >= region.top
                    && token.bbox.top < region.bottom
                    && token.bbox.x0 >= region.x0
                    && token.bbox.x0 < region.x1
            })
            .cloned()
            .collect::<Vec<_>>();
        let text = render_text(&tokens, line_tolerance);

        Ok(PageLayout {
            page_number: self.page_number,
            width: self.width,
            height: self.height,
            tokens,
            text,
        })
    }
}

/// A loaded input document: its label and its pages in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogDocument {
    pub label: String,
    pub pages: Vec<PageLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub source_file: String,
    pub page: u32,
    pub category: String,
    pub product_name: String,
    pub style_code: String,
    pub msrp: String,
    pub weight: String,
    pub features: String,
    pub material: String,
    pub description: String,
}
