//! OFD to PDF rendering.
//!
//! [`OfdRenderer`] takes parsed OFD document models, draws every page with
//! the lopdf page renderer and, for larger jobs, renders contiguous page
//! chunks in parallel before merging them back in page order.

pub mod error;
pub mod fallback;
pub mod pipeline;

pub use error::OfdRenderError;
pub use fallback::{FALLBACK_NOTICE, fallback_document};
pub use pipeline::{ChunkFailurePolicy, OfdRenderer, RenderConfig, RenderOutput};

pub use ofdrender_render_core::{RenderError, RenderMode, RenderStats, TextMismatchPolicy};
pub use ofdrender_traits::{NoSealExtractor, SealError, SealExtractor};
pub use ofdrender_types::{Document, Page};
