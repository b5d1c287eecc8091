//! Helpers shared by the unit tests of this crate.

use crate::canvas::Canvas;
use crate::fonts::FontRegistry;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use std::io::Cursor;
use std::sync::Arc;

pub fn new_canvas() -> Canvas<Cursor<Vec<u8>>> {
    Canvas::new(Cursor::new(Vec::new()), Arc::new(FontRegistry::new())).unwrap()
}

/// Saves the canvas and decodes the content stream of page `page` (1-based).
pub fn page_operations(canvas: Canvas<Cursor<Vec<u8>>>, page: u32) -> Vec<Operation> {
    let bytes = canvas.save().unwrap().into_inner();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let page_id = doc.get_pages()[&page];
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content).unwrap().operations
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}
