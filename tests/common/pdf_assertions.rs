#![allow(dead_code)]

use lopdf::Document as LopdfDocument;
use lopdf::content::{Content, Operation};

/// Decoded content stream operations of page `page` (1-based).
pub fn page_operations(doc: &LopdfDocument, page: u32) -> Vec<Operation> {
    let page_id = doc.get_pages()[&page];
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content).unwrap().operations
}

/// Operator names of every page, in page order.
pub fn operator_sequence(doc: &LopdfDocument) -> Vec<Vec<String>> {
    (1..=doc.get_pages().len() as u32)
        .map(|p| page_operations(doc, p).into_iter().map(|op| op.operator).collect())
        .collect()
}

/// Raw strings passed to `Tj` on page `page`.
pub fn shown_strings(doc: &LopdfDocument, page: u32) -> Vec<Vec<u8>> {
    page_operations(doc, page)
        .iter()
        .filter(|op| op.operator == "Tj")
        .map(|op| op.operands[0].as_str().unwrap().to_vec())
        .collect()
}

/// `[width, height]` of the MediaBox of page `page`.
pub fn media_box(doc: &LopdfDocument, page: u32) -> [f32; 2] {
    let page_id = doc.get_pages()[&page];
    let dict = doc.get_dictionary(page_id).unwrap();
    let values = dict.get(b"MediaBox").unwrap().as_array().unwrap();
    [values[2].as_float().unwrap(), values[3].as_float().unwrap()]
}

/// Text matrix origins on page `page`.
pub fn text_origins(doc: &LopdfDocument, page: u32) -> Vec<(f32, f32)> {
    page_operations(doc, page)
        .iter()
        .filter(|op| op.operator == "Tm")
        .map(|op| (op.operands[4].as_float().unwrap(), op.operands[5].as_float().unwrap()))
        .collect()
}

/// Number of painted images on page `page`.
pub fn image_draws(doc: &LopdfDocument, page: u32) -> usize {
    page_operations(doc, page).iter().filter(|op| op.operator == "Do").count()
}
