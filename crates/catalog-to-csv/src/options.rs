use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ExtractError;
use crate::vocabulary::Vocabulary;

/// Upper bound on how many pages one selection may name.
pub const MAX_SELECTED_PAGES: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                if end - start >= MAX_SELECTED_PAGES {
                    return Err(format!(
                        "range '{token}' spans more than {MAX_SELECTED_PAGES} pages"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                pages.insert(page);
            }
            if pages.len() > MAX_SELECTED_PAGES as usize {
                return Err(format!(
                    "page selection names more than {MAX_SELECTED_PAGES} pages"
                ));
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

/// Distances in layout units (PDF points) used by the region heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTolerances {
    /// Maximum midpoint distance for two tokens to share a line.
    pub line_tolerance: f64,
    /// Midpoint distance used when pairing a `Style` label with its value.
    pub label_line_tolerance: f64,
    /// Fraction of the page height treated as header/logo zone.
    pub header_band: f64,
    /// Gap between the anchor's top edge and the description region.
    pub anchor_offset: f64,
    /// Distance kept left of the materials label when splitting columns.
    pub split_margin: f64,
    pub min_description_chars: usize,
    /// Characters inspected on each side of a bare 7-digit run for price marks.
    pub textual_guard_chars: usize,
}

impl Default for LayoutTolerances {
    fn default() -> Self {
        Self {
            line_tolerance: 5.0,
            label_line_tolerance: 10.0,
            header_band: 0.10,
            anchor_offset: 5.0,
            split_margin: 5.0,
            min_description_chars: 30,
            textual_guard_chars: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub delimiter: u8,
    pub layout: LayoutTolerances,
    pub vocabulary: Vocabulary,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            delimiter: b',',
            layout: LayoutTolerances::default(),
            vocabulary: Vocabulary::default(),
        }
    }
}

impl ExtractOptions {
    /// Rejects tolerances the region heuristics cannot work with.
    pub fn validate(&self) -> Result<(), ExtractError> {
        let layout = &self.layout;
        let distances = [
            ("line_tolerance", layout.line_tolerance),
            ("label_line_tolerance", layout.label_line_tolerance),
            ("anchor_offset", layout.anchor_offset),
            ("split_margin", layout.split_margin),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ExtractError::InvalidOption(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !(0.0..1.0).contains(&layout.header_band) {
            return Err(ExtractError::InvalidOption(format!(
                "header_band must be within [0, 1), got {}",
                layout.header_band
            )));
        }
        Ok(())
    }
}
