//! The per-chunk drawing context.
//!
//! A `Canvas` owns one output sub-document. It is deliberately `!Sync` in
//! spirit: every chunk creates its own and nothing here is shared between
//! workers except the read-only font registry.

use crate::fonts::{EncodedText, FontRegistry};
use crate::images::PdfImage;
use crate::writer::StreamingPdfWriter;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use ofdrender_render_core::RenderError;
use ofdrender_types::Color;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Seek, Write};
use std::sync::Arc;

/// How a constructed path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Stroke,
    Fill,
    FillStroke,
    /// End the path without painting.
    None,
}

impl PaintMode {
    pub fn from_flags(stroke: bool, fill: bool) -> Self {
        match (stroke, fill) {
            (true, true) => PaintMode::FillStroke,
            (false, true) => PaintMode::Fill,
            (true, false) => PaintMode::Stroke,
            (false, false) => PaintMode::None,
        }
    }

    fn operator(self) -> &'static str {
        match self {
            PaintMode::Stroke => "S",
            PaintMode::Fill => "f",
            PaintMode::FillStroke => "B",
            PaintMode::None => "n",
        }
    }
}

/// A registered image XObject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    name: String,
    width: u32,
    height: u32,
}

impl ImageHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Natural size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct GraphicsState {
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<f32>,
}

/// Resource name of the registry face at `index`.
pub fn font_resource_name(index: usize) -> String {
    format!("F{}", index + 1)
}

/// Deterministic XObject name for an image cache key, so the same key gets
/// the same name in every sub-document.
pub fn xobject_name(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric()) {
        format!("Im_{}", key)
    } else {
        let hex: String = key.bytes().map(|b| format!("{:02x}", b)).collect();
        format!("Imx{}", hex)
    }
}

fn color_operands(color: Color) -> Vec<Object> {
    color.to_unit().iter().map(|c| Object::Real(*c)).collect()
}

pub struct Canvas<W: Write + Seek> {
    writer: StreamingPdfWriter<W>,
    fonts: Arc<FontRegistry>,
    page_width: f32,
    page_height: f32,
    operations: Vec<Operation>,
    dirty: bool,
    state: GraphicsState,
    used_fonts: BTreeMap<usize, BTreeSet<u16>>,
    xobjects: BTreeMap<String, ObjectId>,
    images: HashMap<String, Option<ImageHandle>>,
}

impl<W: Write + Seek> Canvas<W> {
    pub fn new(writer: W, fonts: Arc<FontRegistry>) -> Result<Self, RenderError> {
        Ok(Self {
            writer: StreamingPdfWriter::new(writer, "1.7")?,
            fonts,
            page_width: 595.0,
            page_height: 842.0,
            operations: Vec::new(),
            dirty: false,
            state: GraphicsState::default(),
            used_fonts: BTreeMap::new(),
            xobjects: BTreeMap::new(),
            images: HashMap::new(),
        })
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Sets the size of the page being drawn, in points.
    pub fn set_page_size(&mut self, width: f32, height: f32) {
        self.page_width = width;
        self.page_height = height;
        self.dirty = true;
    }

    pub fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    /// Pages finished so far.
    pub fn page_count(&self) -> usize {
        self.writer.page_count()
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
        self.dirty = true;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            self.push("rg", color_operands(color));
            self.state.fill_color = Some(color);
        }
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.state.stroke_color != Some(color) {
            self.push("RG", color_operands(color));
            self.state.stroke_color = Some(color);
        }
    }

    pub fn set_line_width(&mut self, width: f32) {
        if self.state.line_width != Some(width) {
            self.push("w", vec![width.into()]);
            self.state.line_width = Some(width);
        }
    }

    /// Shows `text` with the registry face at `face_index`, baseline at `(x, y)`.
    pub fn draw_text(&mut self, face_index: usize, size: f32, x: f32, y: f32, text: &EncodedText) {
        self.used_fonts.entry(face_index).or_default().extend(text.glyphs.iter().copied());
        let font_name = Object::Name(font_resource_name(face_index).into_bytes());
        self.push("BT", vec![]);
        self.push("Tf", vec![font_name, size.into()]);
        self.push(
            "Tm",
            vec![1.0f32.into(), 0.0f32.into(), 0.0f32.into(), 1.0f32.into(), x.into(), y.into()],
        );
        self.push("Tj", vec![Object::String(text.bytes.clone(), text.format)]);
        self.push("ET", vec![]);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.push("m", vec![x.into(), y.into()]);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.push("l", vec![x.into(), y.into()]);
    }

    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push("c", vec![x1.into(), y1.into(), x2.into(), y2.into(), x.into(), y.into()]);
    }

    pub fn close_path(&mut self) {
        self.push("h", vec![]);
    }

    pub fn paint(&mut self, mode: PaintMode) {
        self.push(mode.operator(), vec![]);
    }

    /// Looks up an image by cache key. `Some(None)` means an earlier decode
    /// failed and the image should be skipped without retrying.
    pub fn cached_image(&self, key: &str) -> Option<Option<&ImageHandle>> {
        self.images.get(key).map(Option::as_ref)
    }

    /// Writes the image XObject now and remembers it under `key`.
    pub fn register_image(&mut self, key: &str, image: &PdfImage) -> Result<ImageHandle, RenderError> {
        let id = image.write_objects(&mut self.writer)?;
        let (width, height) = image.dimensions();
        let handle = ImageHandle { name: xobject_name(key), width, height };
        self.xobjects.insert(handle.name.clone(), id);
        self.images.insert(key.to_string(), Some(handle.clone()));
        Ok(handle)
    }

    pub fn mark_image_failed(&mut self, key: &str) {
        self.images.insert(key.to_string(), None);
    }

    /// Paints an image into the rectangle with lower-left corner `(x, y)`.
    pub fn draw_image(&mut self, image: &ImageHandle, x: f32, y: f32, width: f32, height: f32) {
        self.push("q", vec![]);
        self.push(
            "cm",
            vec![width.into(), 0.0f32.into(), 0.0f32.into(), height.into(), x.into(), y.into()],
        );
        self.push("Do", vec![Object::Name(image.name.clone().into_bytes())]);
        self.push("Q", vec![]);
    }

    /// Finishes the current page and starts a fresh one of the same size.
    pub fn show_page(&mut self) -> Result<(), RenderError> {
        let content = Content { operations: std::mem::take(&mut self.operations) };
        let stream = Stream::new(Dictionary::new(), content.encode()?);
        let content_id = self.writer.write_object(&Object::Stream(stream))?;
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => self.writer.pages_id,
            "MediaBox" => vec![0.0f32.into(), 0.0f32.into(), self.page_width.into(), self.page_height.into()],
            "Contents" => content_id,
            "Resources" => self.writer.resources_id,
        };
        let page_id = self.writer.write_object(&Object::Dictionary(page))?;
        self.writer.add_page(page_id);
        self.state = GraphicsState::default();
        self.dirty = false;
        Ok(())
    }

    /// Finishes the pending page, writes fonts and resources, and returns the
    /// underlying writer. An untouched canvas still yields one blank page.
    pub fn save(mut self) -> Result<W, RenderError> {
        if self.dirty || self.writer.page_count() == 0 {
            self.show_page()?;
        }
        let mut font_dict = Dictionary::new();
        for (&index, glyphs) in &self.used_fonts {
            let face = self
                .fonts
                .face_at(index)
                .ok_or_else(|| RenderError::Other(format!("no font at registry index {}", index)))?;
            let font_id = face.write_objects(&mut self.writer, glyphs)?;
            font_dict.set(font_resource_name(index), font_id);
        }
        let mut xobject_dict = Dictionary::new();
        for (name, id) in &self.xobjects {
            xobject_dict.set(name.clone(), *id);
        }
        let resources = dictionary! {
            "Font" => font_dict,
            "XObject" => xobject_dict,
        };
        Ok(self.writer.finish(resources)?)
    }
}
