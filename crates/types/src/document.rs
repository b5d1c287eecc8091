use crate::color::Color;
use crate::error::ModelError;
use crate::font::{is_valid_font_name, normalize_font_name};
use crate::geometry::{Boundary, Ctm};
use crate::lenient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

fn a4() -> Boundary {
    Boundary::new(0.0, 0.0, 210.0, 297.0)
}

fn default_line_width() -> String {
    "0.25".to_string()
}

fn default_true() -> bool {
    true
}

/// One document unit: pages plus the resources they reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(default = "a4")]
    pub default_page_size: Boundary,
    /// Sparse per-page sizes; may be shorter than `pages`.
    #[serde(default, deserialize_with = "lenient::page_sizes")]
    pub page_sizes: Vec<Option<Boundary>>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub fonts: Vec<FontResource>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub images: Vec<ImageResource>,
    #[serde(default, deserialize_with = "lenient::record_map")]
    pub signatures: HashMap<usize, Vec<Signature>>,
    #[serde(default, deserialize_with = "lenient::record_map")]
    pub annotations: HashMap<usize, Vec<Annotation>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(a4())
    }
}

impl Document {
    pub fn new(default_page_size: Boundary) -> Self {
        Self {
            default_page_size,
            page_sizes: Vec::new(),
            pages: Vec::new(),
            fonts: Vec::new(),
            images: Vec::new(),
            signatures: HashMap::new(),
            annotations: HashMap::new(),
        }
    }

    /// Builds a document from the parser's JSON hand-off.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The page-size table entry for `index` when present and non-empty,
    /// otherwise the document default.
    pub fn page_size_for(&self, index: usize) -> Boundary {
        self.page_sizes
            .get(index)
            .copied()
            .flatten()
            .filter(|b| !b.is_empty())
            .unwrap_or(self.default_page_size)
    }

    pub fn font(&self, id: &str) -> Option<&FontResource> {
        self.fonts.iter().find(|f| f.id == id)
    }

    pub fn image(&self, id: &str) -> Option<&ImageResource> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn signatures_for(&self, page_index: usize) -> &[Signature] {
        self.signatures.get(&page_index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn annotations_for(&self, page_index: usize) -> &[Annotation] {
        self.annotations.get(&page_index).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    pub index: usize,
    #[serde(default, deserialize_with = "lenient::records")]
    pub texts: Vec<TextRun>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub paths: Vec<PathOp>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub images: Vec<ImageRef>,
}

impl Page {
    pub fn new(index: usize) -> Self {
        Self { index, ..Default::default() }
    }
}

/// A positioned run of glyphs (an OFD `TextCode`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub pos: Boundary,
    /// Offset of the first glyph inside `pos`, textual as in the source.
    #[serde(default, alias = "x", deserialize_with = "lenient::numeric_string")]
    pub x_offset: String,
    #[serde(default, alias = "y", deserialize_with = "lenient::numeric_string")]
    pub y_offset: String,
    #[serde(default, alias = "DeltaX")]
    pub delta_x: String,
    #[serde(default, alias = "DeltaY")]
    pub delta_y: String,
    #[serde(default, deserialize_with = "lenient::optional_ctm")]
    pub ctm: Option<Ctm>,
    /// Font resource id.
    #[serde(default)]
    pub font: String,
    pub size: f32,
    #[serde(default)]
    pub color: Color,
}

/// A vector path in abbreviated form.
#[derive(Debug, Clone, Deserialize)]
pub struct PathOp {
    #[serde(alias = "AbbreviatedData")]
    pub data: String,
    pub pos: Boundary,
    #[serde(default)]
    pub stroke_color: Option<Color>,
    #[serde(default)]
    pub fill_color: Option<Color>,
    #[serde(default = "default_line_width", deserialize_with = "lenient::numeric_string")]
    pub line_width: String,
    #[serde(default = "default_true")]
    pub stroke: bool,
    #[serde(default)]
    pub fill: bool,
}

impl Default for PathOp {
    fn default() -> Self {
        Self {
            data: String::new(),
            pos: Boundary::default(),
            stroke_color: None,
            fill_color: None,
            line_width: default_line_width(),
            stroke: true,
            fill: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageRef {
    #[serde(alias = "ResourceID")]
    pub resource_id: String,
    pub pos: Boundary,
    #[serde(default, deserialize_with = "lenient::optional_ctm")]
    pub ctm: Option<Ctm>,
    #[serde(default, deserialize_with = "lenient::optional_boundary")]
    pub wrap_pos: Option<Boundary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FontResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_payload")]
    pub data: Option<Arc<Vec<u8>>>,
}

impl FontResource {
    /// The declared name, preferring `name` and falling back to the family.
    pub fn declared_name(&self) -> &str {
        if is_valid_font_name(&self.name) {
            return self.name.trim();
        }
        match self.family.as_deref() {
            Some(family) if is_valid_font_name(family) => family.trim(),
            _ => "",
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_font_name(self.declared_name())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageResource {
    pub id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(deserialize_with = "lenient::payload")]
    pub data: Arc<Vec<u8>>,
}

impl ImageResource {
    /// Upper-cased declared format, taken from the file suffix when not given.
    pub fn declared_format(&self) -> String {
        let format = self.format.trim();
        if !format.is_empty() {
            return format.to_ascii_uppercase();
        }
        self.file_name
            .as_deref()
            .and_then(|f| f.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_uppercase())
            .unwrap_or_default()
    }
}

/// A seal overlay. The signed value is opaque to the renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    pub boundary: Boundary,
    #[serde(alias = "SignedValue", deserialize_with = "lenient::payload")]
    pub signed_value: Arc<Vec<u8>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub image: Option<StampImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StampImage {
    #[serde(alias = "ResourceID")]
    pub resource_id: String,
    pub boundary: Boundary,
    #[serde(default, deserialize_with = "lenient::optional_ctm")]
    pub ctm: Option<Ctm>,
    #[serde(default, deserialize_with = "lenient::optional_boundary")]
    pub appearance: Option<Boundary>,
}

impl Annotation {
    /// Stamp annotations expressed as an ordinary image placement.
    pub fn to_image_ref(&self) -> Option<ImageRef> {
        if !self.kind.eq_ignore_ascii_case("stamp") {
            return None;
        }
        self.image.as_ref().map(|img| ImageRef {
            resource_id: img.resource_id.clone(),
            pos: img.boundary,
            ctm: img.ctm,
            wrap_pos: img.appearance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "default_page_size": "0 0 210 297",
        "page_sizes": [null, "0 0 100 100", "", "not a box"],
        "fonts": [
            {"id": "3", "name": "Times New Roman"},
            {"name": "missing id"}
        ],
        "images": [{"id": "7", "file_name": "seal.png", "data": "iVBORw=="}],
        "pages": [{
            "index": 0,
            "texts": [
                {"text": "AB", "pos": "10 10 50 10", "x": 0, "y": "5", "DeltaX": "g 1 5", "font": "3", "size": 10, "color": "255 0 0"},
                {"text": "bad", "pos": "10 10"},
                {"text": "CD", "pos": [1, 2, 3, 4], "ctm": "1 0 0", "font": "3", "size": 3.5}
            ],
            "paths": [{"data": "M 0 0 L 10 10", "pos": "0 0 20 20", "line_width": "oops"}],
            "images": [{"resource_id": "7", "pos": "0 0 210 297", "ctm": "1 0 0 1 0 0", "wrap_pos": ""}]
        }],
        "signatures": {"0": [{"boundary": "10 10 30 10", "signed_value": "AAEC"}]},
        "annotations": {"0": [{"type": "Stamp", "image": {"resource_id": "7", "boundary": "5 5 20 20", "appearance": "1 1 2 2"}}]}
    }"#;

    #[test]
    fn decodes_document_and_drops_malformed_records() {
        let doc = Document::from_json(DOC).unwrap();
        assert_eq!(doc.fonts.len(), 1);
        let page = &doc.pages[0];
        assert_eq!(page.texts.len(), 2);
        assert_eq!(page.texts[0].x_offset, "0");
        assert_eq!(page.texts[0].delta_x, "g 1 5");
        assert_eq!(page.texts[0].color, Color::rgb(255, 0, 0));
        // Malformed CTM is treated as absent rather than rejecting the run.
        assert!(page.texts[1].ctm.is_none());
        assert_eq!(page.paths[0].line_width, "oops");
        assert!(page.paths[0].stroke);
        assert!(page.images[0].ctm.is_some());
        assert!(page.images[0].wrap_pos.is_none());
    }

    #[test]
    fn page_size_lookup_falls_back_to_default() {
        let doc = Document::from_json(DOC).unwrap();
        assert_eq!(doc.page_size_for(0), doc.default_page_size);
        assert_eq!(doc.page_size_for(1), Boundary::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(doc.page_size_for(2), doc.default_page_size);
        assert_eq!(doc.page_size_for(3), doc.default_page_size);
        assert_eq!(doc.page_size_for(40), doc.default_page_size);
    }

    #[test]
    fn resources_and_overlays_are_reachable() {
        let doc = Document::from_json(DOC).unwrap();
        assert_eq!(doc.font("3").unwrap().normalized_name(), "Times-Roman");
        assert_eq!(doc.image("7").unwrap().declared_format(), "PNG");
        assert_eq!(doc.signatures_for(0).len(), 1);
        assert_eq!(doc.signatures_for(0)[0].signed_value.as_slice(), &[0u8, 1, 2]);
        assert!(doc.signatures_for(1).is_empty());

        let stamp = doc.annotations_for(0)[0].to_image_ref().unwrap();
        assert_eq!(stamp.resource_id, "7");
        assert_eq!(stamp.wrap_pos, Some(Boundary::new(1.0, 1.0, 2.0, 2.0)));
    }

    #[test]
    fn declared_name_skips_invalid_values() {
        let font = FontResource {
            id: "1".into(),
            name: "http://fonts.example/x".into(),
            family: Some("KaiTi".into()),
            data: None,
        };
        assert_eq!(font.declared_name(), "KaiTi");
    }
}
