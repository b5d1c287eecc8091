#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use ofdrender::{Document, Page};
use ofdrender_types::{Boundary, Color, FontResource, ImageRef, ImageResource, PathOp, Signature, TextRun};
use std::io::Cursor;
use std::sync::Arc;

pub fn a4() -> Boundary {
    Boundary::new(0.0, 0.0, 210.0, 297.0)
}

pub fn font(id: &str, name: &str) -> FontResource {
    FontResource { id: id.into(), name: name.into(), family: None, data: None }
}

pub fn text(content: &str, x: f32, y: f32, delta_x: &str) -> TextRun {
    TextRun {
        text: content.into(),
        pos: Boundary::new(x, y, 50.0, 10.0),
        delta_x: delta_x.into(),
        font: "1".into(),
        size: 10.0,
        ..Default::default()
    }
}

pub fn square(x: f32, y: f32) -> PathOp {
    PathOp {
        data: "M 0 0 L 10 0 L 10 10 L 0 10 C".into(),
        pos: Boundary::new(x, y, 10.0, 10.0),
        stroke_color: Some(Color::rgb(0, 0, 255)),
        ..Default::default()
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 10, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn png_resource(id: &str) -> ImageResource {
    ImageResource {
        id: id.into(),
        format: "PNG".into(),
        file_name: None,
        data: Arc::new(png_bytes(4, 4)),
    }
}

pub fn image_at(id: &str, pos: Boundary) -> ImageRef {
    ImageRef { resource_id: id.into(), pos, ctm: None, wrap_pos: None }
}

pub fn signature(boundary: &str) -> Signature {
    Signature {
        boundary: Boundary::parse(boundary).unwrap(),
        signed_value: Arc::new(vec![0x30, 0x82, 0x01]),
    }
}

/// A document whose page `i` carries the label `P{i}` plus a square, so page
/// order is visible in the output.
pub fn labelled_document(pages: usize) -> Document {
    let mut doc = Document::new(a4());
    doc.fonts.push(font("1", "Helvetica"));
    doc.pages = (0..pages)
        .map(|i| {
            let mut page = Page::new(i);
            page.texts.push(text(&format!("P{}", i), 10.0, 20.0, "5"));
            page.paths.push(square(20.0, 40.0));
            page
        })
        .collect();
    doc
}

/// The rich variant: images and a sized page table on top of the labels.
pub fn mixed_document(pages: usize) -> Document {
    let mut doc = labelled_document(pages);
    doc.images.push(png_resource("7"));
    doc.page_sizes = (0..pages)
        .map(|i| (i % 3 == 1).then(|| Boundary::new(0.0, 0.0, 148.0, 210.0)))
        .collect();
    for page in doc.pages.iter_mut() {
        page.images.push(image_at("7", Boundary::new(100.0, 100.0, 30.0, 30.0)));
    }
    doc
}

/// The smallest sfnt `ttf-parser` accepts: `head`, `hhea` and a one-glyph
/// `maxp`. No outlines and no cmap.
pub fn minimal_truetype() -> Vec<u8> {
    let mut head = Vec::with_capacity(54);
    head.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
    head.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // revision
    head.extend_from_slice(&0u32.to_be_bytes()); // checksum adjustment
    head.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magic
    head.extend_from_slice(&0u16.to_be_bytes()); // flags
    head.extend_from_slice(&1000u16.to_be_bytes()); // units per em
    head.extend_from_slice(&[0; 16]); // created, modified
    head.extend_from_slice(&[0; 8]); // bbox
    head.extend_from_slice(&[0; 6]); // mac style, lowest ppem, direction hint
    head.extend_from_slice(&0u16.to_be_bytes()); // index to loc format
    head.extend_from_slice(&0u16.to_be_bytes()); // glyph data format

    let mut hhea = Vec::with_capacity(36);
    hhea.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    hhea.extend_from_slice(&800i16.to_be_bytes()); // ascender
    hhea.extend_from_slice(&(-200i16).to_be_bytes()); // descender
    hhea.extend_from_slice(&[0; 26]);
    hhea.extend_from_slice(&1u16.to_be_bytes()); // number of h-metrics

    let mut maxp = Vec::with_capacity(6);
    maxp.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    maxp.extend_from_slice(&1u16.to_be_bytes());

    let tables: [(&[u8; 4], &[u8]); 3] = [(b"head", &head), (b"hhea", &hhea), (b"maxp", &maxp)];
    let mut out = Vec::new();
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&[0; 6]); // search range, entry selector, range shift
    let mut offset = 12 + 16 * tables.len() as u32;
    for (tag, data) in &tables {
        out.extend_from_slice(*tag);
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&offset.to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        offset += data.len() as u32;
    }
    for (_, data) in &tables {
        out.extend_from_slice(data);
    }
    out
}
