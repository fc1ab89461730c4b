#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const PAGE_HEIGHT: i64 = 842;
pub const FONT_SIZE: i64 = 10;

/// A line of text placed with its left edge at `x` and its top edge at
/// `top`, measured from the top of the page.
pub type PlacedLine<'a> = (i64, i64, &'a str);

fn build_document(pages: &[Vec<PlacedLine<'_>>]) -> Result<Document, Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();

    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Integer(FONT_SIZE)]),
        ];

        for (x, top, text) in lines {
            // Courier ascends 0.8 em above the baseline.
            let baseline = PAGE_HEIGHT - top - FONT_SIZE * 8 / 10;
            operations.push(Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Integer(*x),
                    Object::Integer(baseline),
                ],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), Object::Integer(PAGE_HEIGHT)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

pub fn create_test_pdf(
    path: &Path,
    pages: &[Vec<PlacedLine<'_>>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = build_document(pages)?;
    doc.save(path)?;
    Ok(())
}

pub fn create_test_pdf_bytes(
    pages: &[Vec<PlacedLine<'_>>],
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = build_document(pages)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A catalog page laid out the way product sheets print it: header,
/// name above the style line, side-by-side features and material columns.
pub fn catalog_page<'a>(name: &'a str, style_line: &'a str) -> Vec<PlacedLine<'a>> {
    vec![
        (50, 90, "INSULATION"),
        (50, 110, name),
        (50, 130, style_line),
        (50, 145, "MSRP $35,000"),
        (50, 160, "Features"),
        (300, 160, "Material"),
        (50, 180, "- Warm and packable"),
        (300, 180, "50D Nylon"),
        (50, 220, "Size S M L"),
        (50, 240, "Estimated Average Weight 380"),
    ]
}

pub fn lookbook_page() -> Vec<PlacedLine<'static>> {
    vec![
        (50, 100, "Autumn in the Alps"),
        (50, 130, "Photographed on location"),
    ]
}
