//! Keyword tables that drive the extraction heuristics.
//!
//! The defaults describe the outdoor-apparel catalogs the tool was built
//! for. Every table is plain data on [`Vocabulary`], so callers and tests can
//! swap in their own terms without touching the heuristics.

/// Category labels in priority order. Longer labels that contain a shorter
/// one (`SLEEPING BAG` vs `BAG`) must come first.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "ALPINE CLOTHING",
    "INSULATION",
    "THERMAL",
    "RAIN WEAR",
    "WIND SHELL",
    "SOFT SHELL",
    "PANTS",
    "BASE LAYER",
    "FIELD WEAR",
    "TRAVEL & COUNTRY",
    "CAP & HAT",
    "GLOVES",
    "SOCKS",
    "SLEEPING BAG",
    "FOOTWEAR",
    "BACKPACK",
    "BAG",
    "ACCESSORIES",
    "CYCLING",
    "SNOW GEAR",
    "CLIMBING",
    "FISHING",
    "PADDLE SPORTS",
    "DOG GEAR",
    "KIDS & BABY",
];

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Boilerplate words matched case-insensitively as whole words.
pub const DEFAULT_NOISE_KEYWORDS: &[&str] = &[
    "mont-bell",
    "montbell",
    "fall",
    "winter",
    "spring",
    "summer",
    "confidential",
    "internal use",
    "not for distribution",
    "KJ",
    "page",
    "MSRP",
];

/// Annotation markers that are noise only when they make up the whole line.
pub const DEFAULT_STANDALONE_MARKERS: &[&str] = &["NEW", "REVISED", "CONTINUED", "SAMPLE"];

pub const DEFAULT_CURRENCY_MARKS: &[char] = &['¥', '￥', '$', '€', '£'];

pub const DEFAULT_FEATURES_KEYWORDS: &[&str] = &["Features", "Feature"];

pub const DEFAULT_MATERIALS_KEYWORDS: &[&str] = &["Materials", "Material", "Fabric"];

pub const DEFAULT_STOP_KEYWORDS: &[&str] = &["Size", "Estimated", "Last"];

pub const DEFAULT_BULLET_MARKERS: &[char] = &['•', '・', '●', '▪', '■', '◆', '·', '-', '*'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub categories: Vec<String>,
    pub noise_keywords: Vec<String>,
    pub standalone_markers: Vec<String>,
    pub currency_marks: Vec<char>,
    pub features_keywords: Vec<String>,
    pub materials_keywords: Vec<String>,
    /// Region terminators, matched case-sensitively as token prefixes.
    pub stop_keywords: Vec<String>,
    pub bullet_markers: Vec<char>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            categories: owned(DEFAULT_CATEGORIES),
            noise_keywords: owned(DEFAULT_NOISE_KEYWORDS),
            standalone_markers: owned(DEFAULT_STANDALONE_MARKERS),
            currency_marks: DEFAULT_CURRENCY_MARKS.to_vec(),
            features_keywords: owned(DEFAULT_FEATURES_KEYWORDS),
            materials_keywords: owned(DEFAULT_MATERIALS_KEYWORDS),
            stop_keywords: owned(DEFAULT_STOP_KEYWORDS),
            bullet_markers: DEFAULT_BULLET_MARKERS.to_vec(),
        }
    }
}

impl Vocabulary {
    #[must_use]
    pub fn has_currency_mark(&self, text: &str) -> bool {
        text.chars().any(|ch| self.currency_marks.contains(&ch))
    }

    #[must_use]
    pub fn starts_with_bullet(&self, text: &str) -> bool {
        text.trim_start()
            .chars()
            .next()
            .is_some_and(|ch| self.bullet_markers.contains(&ch))
    }

    #[must_use]
    pub fn is_features_label(&self, text: &str) -> bool {
        starts_with_any_ignore_case(text, &self.features_keywords)
    }

    #[must_use]
    pub fn is_materials_label(&self, text: &str) -> bool {
        starts_with_any_ignore_case(text, &self.materials_keywords)
    }

    /// Whether `text` opens with a stop keyword as a whole word. Trailing
    /// punctuation is allowed (`Size:`), longer words are not (`Lasting`).
    #[must_use]
    pub fn is_stop_token(&self, text: &str) -> bool {
        let Some(word) = text.split_whitespace().next() else {
            return false;
        };
        let word = word.trim_end_matches(|ch: char| ch.is_ascii_punctuation() || ch == '：');
        self.stop_keywords.iter().any(|keyword| word == keyword)
    }
}

fn starts_with_any_ignore_case(text: &str, keywords: &[String]) -> bool {
    let lowered = text.trim_start().to_lowercase();
    keywords
        .iter()
        .any(|keyword| lowered.starts_with(&keyword.to_lowercase()))
}
