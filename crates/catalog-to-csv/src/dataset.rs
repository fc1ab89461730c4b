use serde::Serialize;

use crate::model::ProductRecord;

/// Output columns, in order.
pub const COLUMNS: [&str; 10] = [
    "Source File",
    "Page",
    "Category",
    "Product Name",
    "Style#",
    "MSRP",
    "Weight (g)",
    "Features",
    "Material",
    "Description",
];

/// Ordered records of one run: documents in input order, pages ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<ProductRecord>,
}

impl Dataset {
    pub(crate) fn push(&mut self, record: ProductRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        COLUMNS.iter().map(ToString::to_string).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(record_row)
    }
}

impl From<Vec<ProductRecord>> for Dataset {
    fn from(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }
}

fn record_row(record: &ProductRecord) -> Vec<String> {
    vec![
        record.source_file.clone(),
        record.page.to_string(),
        record.category.clone(),
        record.product_name.clone(),
        record.style_code.clone(),
        record.msrp.clone(),
        record.weight.clone(),
        record.features.clone(),
        record.material.clone(),
        record.description.clone(),
    ]
}
