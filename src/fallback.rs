//! The single-page notice returned when a job cannot be rendered.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use ofdrender_render_core::mm_to_pt;

pub const FALLBACK_NOTICE: &str = "OFD format error: document could not be rendered";

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;

fn build() -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 20.into()]),
            Operation::new("Td", vec![0.into(), 210.into()]),
            Operation::new("Tj", vec![Object::string_literal(FALLBACK_NOTICE)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), mm_to_pt(A4_WIDTH_MM).into(), mm_to_pt(A4_HEIGHT_MM).into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A valid one-page A4 document carrying [`FALLBACK_NOTICE`].
///
/// Falls back to a fixed minimal document if even that cannot be built.
pub fn fallback_document() -> Vec<u8> {
    match build() {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("[FALLBACK] Could not build the notice document: {}", e);
            MINIMAL_PDF.to_vec()
        }
    }
}

const MINIMAL_PDF: &[u8] = b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595.28 841.89] >>
endobj
trailer
<< /Root 1 0 R >>
%%EOF
";
