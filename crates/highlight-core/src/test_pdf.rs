//! Fixture PDFs for unit tests

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Create a valid test PDF with the specified number of Letter-size pages,
/// each showing "Page N" in Helvetica
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
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
            "Resources" => resources_id,
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

/// Where [`set_page_entry`] writes
pub enum PageNode {
    /// The root `/Pages` node, inherited by every page
    Root,
    /// A single 1-based page
    Page(u32),
}

/// Copy of `pdf` with `key` set on one node of the page tree
pub fn set_page_entry(pdf: &[u8], node: PageNode, key: &str, value: Object) -> Vec<u8> {
    let mut doc = Document::load_mem(pdf).unwrap();
    let id = match node {
        PageNode::Root => {
            let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
            let catalog = doc.get_dictionary(catalog_id).unwrap();
            catalog.get(b"Pages").unwrap().as_reference().unwrap()
        }
        PageNode::Page(number) => doc.get_pages()[&number],
    };
    doc.get_dictionary_mut(id).unwrap().set(key, value);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
