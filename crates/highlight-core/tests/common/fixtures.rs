//! Shared fixtures for highlight-core integration tests

#![allow(dead_code)]

use highlight_core::{ClientRect, SelectionGeometry, SelectionSnapshot, TextLayerGeometry};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::collections::HashMap;

/// Letter-size text layer at 1.0, in points
pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;

/// Create a valid test PDF with the specified number of pages
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        page_ids.push(page_id);
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => num_pages as i64,
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A scrolled viewer: pages stacked vertically with a gap, rendered at `scale`
pub struct StackedPages {
    pub scale: f64,
    pub gap: f64,
    pub mounted: Vec<u32>,
    pub selection: Option<SelectionSnapshot>,
    pub clears: usize,
}

impl StackedPages {
    pub fn new(pages: u32, scale: f64) -> Self {
        Self {
            scale,
            gap: 10.0,
            mounted: (1..=pages).collect(),
            selection: None,
            clears: 0,
        }
    }

    /// Viewport rectangle of a page's text layer
    pub fn layer_bounds(&self, page_number: u32) -> ClientRect {
        let height = PAGE_HEIGHT * self.scale;
        let top = (page_number - 1) as f64 * (height + self.gap);
        ClientRect::from_origin_size(0.0, top, PAGE_WIDTH * self.scale, height)
    }

    /// Select text on a page given rectangles in that page's unscaled space
    pub fn select(&mut self, text: &str, page_number: u32, rects: &[(f64, f64, f64, f64)]) {
        let origin = self.layer_bounds(page_number);
        let client_rects = rects
            .iter()
            .map(|&(left, top, right, bottom)| {
                ClientRect::new(
                    origin.left + left * self.scale,
                    origin.top + top * self.scale,
                    origin.left + right * self.scale,
                    origin.top + bottom * self.scale,
                )
            })
            .collect();
        self.selection = Some(SelectionSnapshot::new(text, client_rects));
    }
}

impl SelectionGeometry for StackedPages {
    fn selection(&self) -> Option<SelectionSnapshot> {
        self.selection.clone()
    }

    fn text_layer(&self, page_number: u32) -> Option<TextLayerGeometry> {
        if !self.mounted.contains(&page_number) {
            return None;
        }
        Some(TextLayerGeometry::from_bounds(self.layer_bounds(page_number)))
    }

    fn clear_selection(&mut self) {
        self.selection = None;
        self.clears += 1;
    }
}

/// Map of page number to a lookup by id, for quick assertions
pub fn ids_by_page<'a, I>(records: I) -> HashMap<u32, Vec<String>>
where
    I: IntoIterator<Item = &'a highlight_core::HighlightRecord>,
{
    let mut map: HashMap<u32, Vec<String>> = HashMap::new();
    for record in records {
        map.entry(record.page_number)
            .or_default()
            .push(record.id.clone());
    }
    map
}
