//! Streaming OFD page renderer using lopdf.
//!
//! A [`Canvas`] owns one output sub-document and writes page content, images
//! and fonts as they are produced. [`PageRenderer`] draws model pages onto it;
//! the scheduler in the root crate gives every chunk its own canvas.

mod canvas;
mod fonts;
mod images;
mod overlay;
mod page;
mod path;
mod placement;
mod text;
mod writer;

#[cfg(test)]
mod test_support;

pub use canvas::{Canvas, ImageHandle, PaintMode, font_resource_name, xobject_name};
pub use fonts::{DEFAULT_FONT, EncodedText, FontError, FontFace, FontRegistry};
pub use images::{PdfImage, SUPPORTED_FORMATS, is_supported_format};
pub use overlay::{draw_annotations, draw_signatures};
pub use page::PageRenderer;
pub use path::{
    ArcShape, PathCommand, PathMode, Point, Segment, arc_to_cubics, assemble, draw_path, tokenize,
};
pub use placement::{
    Placement, PlacementKind, draw_image_ref, place, place_at_boundary, resolve_resource,
};
pub use text::{check_in_page, draw_text_run};
pub use writer::{StreamingPdfWriter, flate_compress};
