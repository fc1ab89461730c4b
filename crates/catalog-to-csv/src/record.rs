use tracing::{debug, warn};

use crate::anchor::{AnchorContext, locate_anchor};
use crate::error::ExtractError;
use crate::fields::{NoiseFilter, detect_category, extract_price, extract_weight};
use crate::model::{PageLayout, ProductRecord};
use crate::options::ExtractOptions;
use crate::regions::{
    ContentColumns, RegionContext, extract_columns, extract_description, extract_name,
    find_section_labels,
};
use crate::warning::{ExtractWarning, WarningCode};

/// Turns single pages into records. Built once per run so the vocabulary
/// patterns are compiled only once.
pub struct PageExtractor<'a> {
    options: &'a ExtractOptions,
    noise: NoiseFilter,
}

impl<'a> PageExtractor<'a> {
    pub fn new(options: &'a ExtractOptions) -> Result<Self, ExtractError> {
        Ok(Self {
            options,
            noise: NoiseFilter::new(&options.vocabulary)?,
        })
    }

    /// Extracts the record for one page, or `None` when the page is blank or
    /// carries no style anchor. Region failures only blank their own field.
    pub fn extract(
        &self,
        source_file: &str,
        page: &PageLayout,
        warnings: &mut Vec<ExtractWarning>,
    ) -> Option<ProductRecord> {
        if page.is_blank() {
            debug!(source_file, page = page.page_number, "skipping page without tokens");
            return None;
        }

        let layout = &self.options.layout;
        let vocabulary = &self.options.vocabulary;
        let anchor = locate_anchor(page, &AnchorContext { layout, vocabulary })?;
        let anchor_y = anchor.anchor_y(page);
        let ctx = RegionContext {
            layout,
            vocabulary,
            noise: &self.noise,
        };

        let mut recover = |field: &str, error: ExtractError| {
            warn!(source_file, page = page.page_number, field, %error, "region extraction failed");
            warnings.push(
                ExtractWarning::new(
                    WarningCode::RegionRecovered,
                    format!("{field} left empty: {error}"),
                )
                .with_document(source_file)
                .with_page(page.page_number),
            );
        };

        let product_name = extract_name(page, &anchor, anchor_y, &ctx).unwrap_or_else(|error| {
            recover("product name", error);
            String::new()
        });

        let body_top = anchor_y + layout.anchor_offset;
        let labels = find_section_labels(page, body_top, vocabulary);
        let description =
            extract_description(page, anchor_y, &labels, &ctx).unwrap_or_else(|error| {
                recover("description", error);
                String::new()
            });
        let columns = extract_columns(page, body_top, &labels, &ctx).unwrap_or_else(|error| {
            recover("features/material", error);
            ContentColumns::default()
        });

        Some(ProductRecord {
            source_file: source_file.to_string(),
            page: page.page_number,
            category: detect_category(&page.text, &vocabulary.categories),
            product_name,
            style_code: anchor.code,
            msrp: extract_price(&page.text),
            weight: extract_weight(&page.text),
            features: columns.features,
            material: columns.material,
            description,
        })
    }
}
