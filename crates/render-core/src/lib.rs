//! Core rendering abstractions shared by the page renderer and the scheduler:
//! - the error taxonomy for rendering
//! - millimetre/point conversion and the page Y flip
//! - glyph coordinate expansion from delta rules
//! - degradation counters and drawing options

mod error;
pub mod options;
mod stats;
pub mod transform;
pub mod utils;

pub use error::RenderError;
pub use options::{DrawOptions, RenderMode, TextMismatchPolicy, UnknownOption};
pub use stats::RenderStats;
pub use transform::{axis_positions, expand_delta, parse_offset};
pub use utils::{PT_PER_MM, flip_y, mm_to_pt, to_pdf_point};
