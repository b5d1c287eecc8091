//! Document model handed over by the OFD container parser.
//!
//! Everything positional is in millimetres with the origin at the page's
//! top-left corner. The model is built once and read-only during rendering.

pub mod color;
pub mod document;
pub mod error;
pub mod font;
pub mod geometry;
mod lenient;

pub use color::Color;
pub use document::{
    Annotation, Document, FontResource, ImageRef, ImageResource, Page, PathOp, Signature,
    StampImage, TextRun,
};
pub use error::ModelError;
pub use font::{is_valid_font_name, normalize_font_name};
pub use geometry::{Axis, Boundary, Ctm};
