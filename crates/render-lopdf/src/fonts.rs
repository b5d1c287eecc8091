//! Font registry and per-face text encoding.
//!
//! The registry starts with a CID-keyed Song face (always first, the
//! guaranteed entry) and the standard Latin faces. Fonts embedded in the
//! OFD package are added before rendering starts and the registry is then
//! shared read-only with every chunk.

use crate::writer::{StreamingPdfWriter, flate_compress};
use log::{debug, warn};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};
use ofdrender_render_core::RenderError;
use ofdrender_types::{is_valid_font_name, normalize_font_name};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::io::{Seek, Write};
use std::sync::Arc;
use thiserror::Error;

/// The guaranteed first entry of every registry.
pub const DEFAULT_FONT: &str = "STSong-Light";

/// Preferred substitution order when a face cannot draw a run.
const FALLBACK_ORDER: [&str; 18] = [
    "STSong-Light",
    "宋体",
    "SimSun",
    "KaiTi",
    "SimKai",
    "黑体",
    "SimHei",
    "仿宋",
    "FangSong",
    "Times-Roman",
    "TimesNewRoman",
    "Courier",
    "Helvetica",
    "PingFang SC",
    "Songti SC",
    "Microsoft YaHei",
    "Source Han Serif SC",
    "Source Han Sans SC",
];

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("timesnewroman", "Times-Roman"),
        ("times", "Times-Roman"),
        ("simsun", "SimSun"),
        ("simhei", "SimHei"),
        ("simsong", "SimSun"),
        ("kai", "KaiTi"),
        ("simkai", "KaiTi"),
        ("fangsong", "FangSong"),
        ("msyh", "Microsoft YaHei"),
        ("microsoftyahei", "Microsoft YaHei"),
        ("pingfang", "PingFang SC"),
        ("pingfangsc", "PingFang SC"),
        ("songti", "Songti SC"),
        ("sourcehanserif", "Source Han Serif SC"),
        ("sourcehansans", "Source Han Sans SC"),
        ("helvetica", "Helvetica"),
        ("arial", "Helvetica"),
        ("courier", "Courier"),
        ("couriernew", "Courier"),
    ])
});

/// Faces preferred for names that look like numeric or symbol fields.
const MONOSPACE_PREFERENCE: [&str; 3] = ["Courier", "SimHei", "Microsoft YaHei"];

#[derive(Error, Debug)]
pub enum FontError {
    #[error("invalid font name '{0}'")]
    InvalidName(String),
    #[error("font data for '{name}' could not be parsed: {reason}")]
    InvalidData { name: String, reason: String },
}

/// Metrics of a CID-keyed font the viewer is expected to supply.
#[derive(Debug)]
struct CidCollection {
    ordering: &'static str,
    supplement: i64,
    encoding: &'static str,
    bbox: [i64; 4],
    ascent: i64,
    descent: i64,
    cap_height: i64,
    stem_v: i64,
}

static ADOBE_GB1: CidCollection = CidCollection {
    ordering: "GB1",
    supplement: 2,
    encoding: "UniGB-UCS2-H",
    bbox: [-25, -254, 1000, 880],
    ascent: 880,
    descent: -120,
    cap_height: 880,
    stem_v: 93,
};

#[derive(Debug, Clone)]
enum FontKind {
    /// One of the standard 14 Type 1 fonts, WinAnsi encoded.
    Standard,
    Cid(&'static CidCollection),
    /// A TrueType/OpenType program carried by the document.
    Embedded(Arc<EmbeddedProgram>),
}

/// Program bytes plus the Unicode cmap, read once at registration.
#[derive(Debug)]
struct EmbeddedProgram {
    data: Arc<Vec<u8>>,
    glyphs: HashMap<char, u16>,
}

impl EmbeddedProgram {
    fn parse(data: Arc<Vec<u8>>) -> Result<Self, ttf_parser::FaceParsingError> {
        let face = ttf_parser::Face::parse(&data, 0)?;
        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|code| {
                    let Some(c) = char::from_u32(code) else { return };
                    if let Some(gid) = subtable.glyph_index(code).filter(|g| g.0 != 0) {
                        glyphs.entry(c).or_insert(gid.0);
                    }
                });
            }
        }
        Ok(Self { data, glyphs })
    }

    fn glyph(&self, c: char) -> Option<u16> {
        self.glyphs.get(&c).copied()
    }
}

/// Encoded bytes of a run plus the glyph ids it uses.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedText {
    pub bytes: Vec<u8>,
    pub format: StringFormat,
    pub glyphs: Vec<u16>,
}

#[derive(Debug, Clone)]
pub struct FontFace {
    name: String,
    kind: FontKind,
}

impl FontFace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, FontKind::Embedded(_))
    }

    /// Encodes `text` for this face, or `None` if some character has no glyph.
    pub fn encode(&self, text: &str) -> Option<EncodedText> {
        self.encode_with(text, false)
    }

    /// Encodes `text`, substituting a placeholder for characters the face lacks.
    pub fn encode_lossy(&self, text: &str) -> EncodedText {
        self.encode_with(text, true).unwrap_or(EncodedText {
            bytes: Vec::new(),
            format: StringFormat::Literal,
            glyphs: Vec::new(),
        })
    }

    fn encode_with(&self, text: &str, lossy: bool) -> Option<EncodedText> {
        match &self.kind {
            FontKind::Standard => {
                let bytes = text
                    .chars()
                    .map(|c| win_ansi_byte(c).or(lossy.then_some(b'?')))
                    .collect::<Option<Vec<u8>>>()?;
                Some(EncodedText { bytes, format: StringFormat::Literal, glyphs: Vec::new() })
            }
            FontKind::Cid(_) => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let code = match u16::try_from(c as u32) {
                        Ok(code) if !c.is_control() => code,
                        _ if lossy => u16::from(b'?'),
                        _ => return None,
                    };
                    bytes.extend_from_slice(&code.to_be_bytes());
                }
                Some(EncodedText { bytes, format: StringFormat::Hexadecimal, glyphs: Vec::new() })
            }
            FontKind::Embedded(program) => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                let mut glyphs = Vec::with_capacity(text.len());
                for c in text.chars() {
                    let gid = match program.glyph(c) {
                        Some(gid) => gid,
                        _ if lossy => 0,
                        _ => return None,
                    };
                    bytes.extend_from_slice(&gid.to_be_bytes());
                    glyphs.push(gid);
                }
                Some(EncodedText { bytes, format: StringFormat::Hexadecimal, glyphs })
            }
        }
    }

    /// Writes the font dictionary (and descendants) and returns its id.
    pub(crate) fn write_objects<W: Write + Seek>(
        &self,
        writer: &mut StreamingPdfWriter<W>,
        used_glyphs: &BTreeSet<u16>,
    ) -> Result<ObjectId, RenderError> {
        let base_font = pdf_base_name(&self.name);
        let base_name = Object::Name(base_font.as_bytes().to_vec());
        let font = match &self.kind {
            FontKind::Standard => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base_name,
                "Encoding" => "WinAnsiEncoding",
            },
            FontKind::Cid(cid) => {
                let descriptor = dictionary! {
                    "Type" => "FontDescriptor",
                    "FontName" => base_name.clone(),
                    "Flags" => 6,
                    "FontBBox" => cid.bbox.iter().map(|v| Object::Integer(*v)).collect::<Vec<Object>>(),
                    "ItalicAngle" => 0,
                    "Ascent" => cid.ascent,
                    "Descent" => cid.descent,
                    "CapHeight" => cid.cap_height,
                    "StemV" => cid.stem_v,
                };
                let descriptor_id = writer.write_object(&Object::Dictionary(descriptor))?;
                let descendant = dictionary! {
                    "Type" => "Font",
                    "Subtype" => "CIDFontType0",
                    "BaseFont" => base_name.clone(),
                    "CIDSystemInfo" => cid_system_info(cid.ordering, cid.supplement),
                    "FontDescriptor" => descriptor_id,
                    "DW" => 1000,
                    // Half-width proportional Latin range of the collection.
                    "W" => vec![Object::Integer(1), Object::Integer(95), Object::Integer(500)],
                };
                let descendant_id = writer.write_object(&Object::Dictionary(descendant))?;
                type0(&base_font, cid.encoding, descendant_id)
            }
            FontKind::Embedded(program) => {
                let data = &program.data;
                let face = ttf_parser::Face::parse(data, 0).map_err(|e| {
                    RenderError::Pdf(format!("embedded font '{}' unreadable: {}", self.name, e))
                })?;
                let units = f32::from(face.units_per_em().max(1));
                let scale = |v: i16| (f32::from(v) * 1000.0 / units).round() as i64;
                let bbox = face.global_bounding_box();

                let mut file_dict = Dictionary::new();
                file_dict.set("Length1", data.len() as i64);
                file_dict.set("Filter", "FlateDecode");
                let file_id = writer.write_object(&Object::Stream(Stream::new(file_dict, flate_compress(data)?)))?;

                let descriptor = dictionary! {
                    "Type" => "FontDescriptor",
                    "FontName" => base_name.clone(),
                    "Flags" => 4,
                    "FontBBox" => vec![
                        Object::Integer(scale(bbox.x_min)),
                        Object::Integer(scale(bbox.y_min)),
                        Object::Integer(scale(bbox.x_max)),
                        Object::Integer(scale(bbox.y_max)),
                    ],
                    "ItalicAngle" => 0,
                    "Ascent" => scale(face.ascender()),
                    "Descent" => scale(face.descender()),
                    "CapHeight" => scale(face.capital_height().unwrap_or(face.ascender())),
                    "StemV" => 80,
                    "FontFile2" => file_id,
                };
                let descriptor_id = writer.write_object(&Object::Dictionary(descriptor))?;

                let mut widths = Vec::with_capacity(used_glyphs.len() * 2);
                for &gid in used_glyphs {
                    let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
                    widths.push(Object::Integer(i64::from(gid)));
                    widths.push(Object::Array(vec![Object::Integer(
                        (f32::from(advance) * 1000.0 / units).round() as i64,
                    )]));
                }
                let descendant = dictionary! {
                    "Type" => "Font",
                    "Subtype" => "CIDFontType2",
                    "BaseFont" => base_name.clone(),
                    "CIDSystemInfo" => cid_system_info("Identity", 0),
                    "FontDescriptor" => descriptor_id,
                    "CIDToGIDMap" => "Identity",
                    "DW" => 1000,
                    "W" => widths,
                };
                let descendant_id = writer.write_object(&Object::Dictionary(descendant))?;
                type0(&base_font, "Identity-H", descendant_id)
            }
        };
        Ok(writer.write_object(&Object::Dictionary(font))?)
    }
}

fn cid_system_info(ordering: &str, supplement: i64) -> Dictionary {
    dictionary! {
        "Registry" => Object::string_literal("Adobe"),
        "Ordering" => Object::string_literal(ordering),
        "Supplement" => supplement,
    }
}

fn type0(base_font: &str, encoding: &str, descendant: ObjectId) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => encoding,
        "DescendantFonts" => vec![Object::Reference(descendant)],
    }
}

/// PDF names only carry printable ASCII; anything else is folded to `_`.
fn pdf_base_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '+' { c } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '_') { "OFDFont".to_string() } else { cleaned }
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => Some(match c {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => return None,
        }),
    }
}

/// Name → face table. Indices are stable: faces are only ever appended.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    faces: Vec<FontFace>,
    by_name: HashMap<String, usize>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut registry = Self { faces: Vec::new(), by_name: HashMap::new() };
        registry.push(DEFAULT_FONT, FontKind::Cid(&ADOBE_GB1));
        for name in ["Helvetica", "Times-Roman", "Courier"] {
            registry.push(name, FontKind::Standard);
        }
        registry
    }

    fn push(&mut self, name: &str, kind: FontKind) -> usize {
        let index = self.faces.len();
        self.faces.push(FontFace { name: name.to_string(), kind });
        self.by_name.insert(name.to_string(), index);
        index
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registers an embedded TrueType/OpenType program and returns the name it
    /// is reachable under. Registering the same bytes again is a no-op.
    pub fn register(&mut self, name: &str, data: Arc<Vec<u8>>) -> Result<String, FontError> {
        let normalized = normalize_font_name(name.trim());
        if !is_valid_font_name(&normalized) {
            return Err(FontError::InvalidName(name.to_string()));
        }
        if let Some(&index) = self.by_name.get(&normalized) {
            match &self.faces[index].kind {
                FontKind::Embedded(existing) if existing.data.as_slice() == data.as_slice() => {}
                _ => warn!(
                    "[FONTS] '{}' is already registered; keeping the first registration",
                    normalized
                ),
            }
            return Ok(normalized);
        }
        let program = EmbeddedProgram::parse(data).map_err(|e| FontError::InvalidData {
            name: normalized.clone(),
            reason: e.to_string(),
        })?;
        self.push(&normalized, FontKind::Embedded(Arc::new(program)));
        debug!("[FONTS] Registered embedded font '{}'", normalized);
        Ok(normalized)
    }

    pub fn default_face(&self) -> (usize, &FontFace) {
        (0, &self.faces[0])
    }

    pub fn face(&self, name: &str) -> Option<(usize, &FontFace)> {
        self.by_name.get(name).map(|&i| (i, &self.faces[i]))
    }

    pub(crate) fn face_at(&self, index: usize) -> Option<&FontFace> {
        self.faces.get(index)
    }

    /// Maps any declared name onto a registered one. Never fails.
    pub fn resolve(&self, name: &str) -> &str {
        let default = self.faces[0].name.as_str();
        let name = name.trim();
        if name.is_empty() {
            return default;
        }
        let key = name.to_lowercase().replace(' ', "");
        if let Some(mapped) = ALIASES.get(key.as_str()) {
            if let Some((_, face)) = self.face(mapped) {
                return face.name();
            }
        }
        if let Some((_, face)) = self.face(name) {
            return face.name();
        }
        if let Some((_, face)) = self.face(&normalize_font_name(name)) {
            return face.name();
        }
        let prefix: String = key.chars().take(5).collect();
        if let Some(face) = self.faces.iter().find(|f| f.name.to_lowercase().starts_with(&prefix)) {
            return face.name();
        }
        let looks_numeric = name
            .chars()
            .any(|c| c.is_ascii_digit() || "%@#$&*()[]{}".contains(c));
        if looks_numeric {
            if let Some(face) = MONOSPACE_PREFERENCE.iter().find_map(|n| self.face(n)) {
                return face.1.name();
            }
        }
        default
    }

    /// Registered names in substitution order; embedded faces come last.
    pub fn fallback_list(&self) -> Vec<&str> {
        let mut list: Vec<&str> = FALLBACK_ORDER
            .iter()
            .filter_map(|n| self.face(n).map(|(_, f)| f.name()))
            .collect();
        for face in &self.faces {
            if !list.contains(&face.name()) {
                list.push(face.name());
            }
        }
        list
    }

    /// The ordered cascade for a run: requested face, a bounded prefix of the
    /// fallback list, then the default.
    pub fn candidates<'a>(&'a self, requested: &'a str, limit: usize) -> Vec<&'a str> {
        let mut out: Vec<&str> = Vec::with_capacity(limit + 2);
        let fallbacks = self.fallback_list();
        let chain = std::iter::once(requested)
            .chain(fallbacks.into_iter().take(limit))
            .chain(std::iter::once(self.faces[0].name()));
        for name in chain {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_present_with_song_first() {
        let registry = FontRegistry::new();
        assert_eq!(registry.default_face().1.name(), DEFAULT_FONT);
        assert!(registry.contains("Helvetica"));
        assert!(registry.contains("Times-Roman"));
        assert!(registry.contains("Courier"));
    }

    #[test]
    fn resolve_never_fails() {
        let registry = FontRegistry::new();
        assert_eq!(registry.resolve(""), DEFAULT_FONT);
        assert_eq!(registry.resolve("Times New Roman"), "Times-Roman");
        assert_eq!(registry.resolve("helvetica"), "Helvetica");
        assert_eq!(registry.resolve("Courier New"), "Courier");
        assert_eq!(registry.resolve("宋体"), DEFAULT_FONT);
        assert_eq!(registry.resolve("Helvet"), "Helvetica");
        assert_eq!(registry.resolve("Zz9"), "Courier");
        assert_eq!(registry.resolve("Wingdings"), DEFAULT_FONT);
    }

    #[test]
    fn rejects_bad_names_and_bad_bytes() {
        let mut registry = FontRegistry::new();
        assert!(matches!(
            registry.register("http://x/y", Arc::new(vec![0; 8])),
            Err(FontError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("Broken", Arc::new(vec![0; 8])),
            Err(FontError::InvalidData { .. })
        ));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn registering_over_a_builtin_keeps_the_builtin() {
        let mut registry = FontRegistry::new();
        let name = registry.register("Helvetica", Arc::new(vec![1, 2, 3])).unwrap();
        assert_eq!(name, "Helvetica");
        assert_eq!(registry.len(), 4);
        assert!(!registry.face("Helvetica").unwrap().1.is_embedded());
    }

    #[test]
    fn standard_faces_encode_latin_only() {
        let registry = FontRegistry::new();
        let (_, helvetica) = registry.face("Helvetica").unwrap();
        assert_eq!(helvetica.encode("Caf\u{e9}").unwrap().bytes, b"Caf\xe9".to_vec());
        assert!(helvetica.encode("中").is_none());
        assert_eq!(helvetica.encode_lossy("A中").bytes, b"A?".to_vec());
    }

    #[test]
    fn cid_face_encodes_bmp_as_ucs2() {
        let registry = FontRegistry::new();
        let (_, song) = registry.default_face();
        let encoded = song.encode("中A").unwrap();
        assert_eq!(encoded.bytes, vec![0x4E, 0x2D, 0x00, 0x41]);
        assert_eq!(encoded.format, StringFormat::Hexadecimal);
        assert!(song.encode("\u{1F600}").is_none());
    }

    #[test]
    fn cascade_is_ordered_and_deduplicated() {
        let registry = FontRegistry::new();
        let chain = registry.candidates("Helvetica", 10);
        assert_eq!(chain[0], "Helvetica");
        assert_eq!(chain[1], DEFAULT_FONT);
        assert_eq!(chain.iter().filter(|n| **n == "Helvetica").count(), 1);
        assert_eq!(registry.candidates("Courier", 0), vec!["Courier", DEFAULT_FONT]);
    }

    /// Builds a TrueType program whose Windows Unicode cmap maps `A..=C` to
    /// glyphs 1..=3.
    fn font_with_cmap() -> Vec<u8> {
        let mut head = Vec::new();
        head.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        head.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        head.extend_from_slice(&0u32.to_be_bytes());
        head.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
        head.extend_from_slice(&0u16.to_be_bytes());
        head.extend_from_slice(&1000u16.to_be_bytes());
        head.extend_from_slice(&[0; 30]);
        head.extend_from_slice(&0u16.to_be_bytes());
        head.extend_from_slice(&0u16.to_be_bytes());

        let mut hhea = Vec::new();
        hhea.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        hhea.extend_from_slice(&800i16.to_be_bytes());
        hhea.extend_from_slice(&(-200i16).to_be_bytes());
        hhea.extend_from_slice(&[0; 26]);
        hhea.extend_from_slice(&1u16.to_be_bytes());

        let mut maxp = Vec::new();
        maxp.extend_from_slice(&0x0000_5000u32.to_be_bytes());
        maxp.extend_from_slice(&4u16.to_be_bytes());

        // Format 4: one segment for A..=C plus the 0xFFFF terminator.
        let words: [u16; 16] = [
            4, 32, 0, 4, 4, 1, 0, // header and binary search fields
            0x43, 0xFFFF, 0, // end codes, reserved pad
            0x41, 0xFFFF, // start codes
            (1u16).wrapping_sub(0x41), 1, // id deltas
            0, 0, // id range offsets
        ];
        let mut cmap = Vec::new();
        cmap.extend_from_slice(&0u16.to_be_bytes());
        cmap.extend_from_slice(&1u16.to_be_bytes());
        cmap.extend_from_slice(&3u16.to_be_bytes());
        cmap.extend_from_slice(&1u16.to_be_bytes());
        cmap.extend_from_slice(&12u32.to_be_bytes());
        for word in words {
            cmap.extend_from_slice(&word.to_be_bytes());
        }

        let tables: [(&[u8; 4], &[u8]); 4] =
            [(b"cmap", &cmap), (b"head", &head), (b"hhea", &hhea), (b"maxp", &maxp)];
        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        out.extend_from_slice(&[0; 6]);
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

    #[test]
    fn embedded_glyph_map_is_read_at_registration() {
        let mut registry = FontRegistry::new();
        let name = registry.register("Mapped", Arc::new(font_with_cmap())).unwrap();
        let (_, face) = registry.face(&name).unwrap();
        let FontKind::Embedded(program) = &face.kind else { panic!("expected an embedded face") };
        assert_eq!(program.glyphs.len(), 3);
        assert_eq!(program.glyph('B'), Some(2));

        let encoded = face.encode("CAB").unwrap();
        assert_eq!(encoded.glyphs, vec![3, 1, 2]);
        assert_eq!(encoded.bytes, vec![0, 3, 0, 1, 0, 2]);
        assert!(face.encode("D").is_none());
        assert_eq!(face.encode_lossy("AD").glyphs, vec![1, 0]);
    }

    #[test]
    fn base_names_are_pdf_safe() {
        assert_eq!(pdf_base_name("Source Han Sans"), "Source_Han_Sans");
        assert_eq!(pdf_base_name("宋体"), "OFDFont");
    }
}
