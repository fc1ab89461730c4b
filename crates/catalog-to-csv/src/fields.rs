use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExtractError;
use crate::vocabulary::{UNCATEGORIZED, Vocabulary};

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)MSRP[^0-9¥￥$€£]{0,20}[¥￥$€£]\s*([0-9][0-9,]*)")
        .expect("hardcoded price regex is valid")
});

static WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Estimated\s+Average\s+Weight\s*(?:\(\s*g\s*\))?\s*[:：]?\s*([0-9]+(?:\.[0-9]+)?|TBA|ТВА)",
    )
    .expect("hardcoded weight regex is valid")
});

static COLOR_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Z0-9]{1,4}\s*\([^()]{1,24}\)[\s,/]*)+$")
        .expect("hardcoded colour code regex is valid")
});

static TWO_LETTER_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("hardcoded code regex is valid"));

static BARE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[0-9]{4}[./-][0-9]{1,2}[./-][0-9]{1,2}|[0-9]{1,2}[./-][0-9]{1,2}(?:[./-][0-9]{2,4})?)$",
    )
    .expect("hardcoded date regex is valid")
});

static DIGITS_AND_SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s]+$").expect("hardcoded digits regex is valid"));

static PAGINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:p\.?\s*)?[0-9]+\s*(?:/|of)\s*[0-9]+$")
        .expect("hardcoded pagination regex is valid")
});

/// Digits of the first currency amount following `MSRP`, or `"0"`.
#[must_use]
pub fn extract_price(text: &str) -> String {
    PRICE_RE
        .captures(text)
        .and_then(|capture| capture.get(1))
        .map(|value| value.as_str().replace(',', ""))
        .filter(|digits| !digits.is_empty())
        .unwrap_or_else(|| "0".to_string())
}

#[must_use]
pub fn extract_weight(text: &str) -> String {
    let Some(value) = WEIGHT_RE.captures(text).and_then(|capture| capture.get(1)) else {
        return String::new();
    };

    let value = value.as_str();
    if value.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        value.to_string()
    } else {
        // Cyrillic look-alikes show up in some exports.
        "TBA".to_string()
    }
}

#[must_use]
pub fn detect_category(text: &str, categories: &[String]) -> String {
    categories
        .iter()
        .find(|category| text.contains(category.as_str()))
        .cloned()
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Colour legends such as `BK(Black) NV(Navy)`.
#[must_use]
pub fn is_color_code_line(line: &str) -> bool {
    COLOR_CODE_RE.is_match(line.trim())
}

#[must_use]
pub fn is_two_letter_code(line: &str) -> bool {
    TWO_LETTER_CODE_RE.is_match(line.trim())
}

#[must_use]
pub fn is_bare_date(line: &str) -> bool {
    BARE_DATE_RE.is_match(line.trim())
}

#[must_use]
pub fn is_digits_and_spaces(line: &str) -> bool {
    DIGITS_AND_SPACES_RE.is_match(line)
}

/// Recognises boilerplate lines: brand and season words, confidentiality
/// stamps, annotation codes, pagination and price markers.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    keywords: Option<Regex>,
    standalone_markers: Vec<String>,
    currency_marks: Vec<char>,
}

impl NoiseFilter {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, ExtractError> {
        let alternatives = vocabulary
            .noise_keywords
            .iter()
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>();
        let keywords = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)(?:^|[^\p{{L}}\p{{N}}])(?:{})(?:$|[^\p{{L}}\p{{N}}])",
                alternatives.join("|")
            ))?)
        };

        Ok(Self {
            keywords,
            standalone_markers: vocabulary
                .standalone_markers
                .iter()
                .map(|marker| marker.trim().to_lowercase())
                .collect(),
            currency_marks: vocabulary.currency_marks.clone(),
        })
    }

    #[must_use]
    pub fn is_boilerplate(&self, line: &str) -> bool {
        let line = line.trim();
        if line.chars().any(|ch| self.currency_marks.contains(&ch)) {
            return true;
        }
        if PAGINATION_RE.is_match(line) {
            return true;
        }
        let lowered = line.to_lowercase();
        if self.standalone_markers.contains(&lowered) {
            return true;
        }
        self.keywords
            .as_ref()
            .is_some_and(|keywords| keywords.is_match(line))
    }

    /// Whether a name-region line can never be the product name.
    #[must_use]
    pub fn is_name_noise(&self, line: &str, anchor_code: &str) -> bool {
        let line = line.trim();
        line.is_empty()
            || line.contains(anchor_code)
            || line.contains("Style")
            || self.is_boilerplate(line)
            || is_color_code_line(line)
            || is_bare_date(line)
            || is_digits_and_spaces(line)
    }
}
