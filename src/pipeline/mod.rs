//! Job orchestration: configuration, the sequential/concurrent gate, chunk
//! fan-out and the ordered merge.
//!
//! ```ignore
//! use ofdrender::{OfdRenderer, RenderConfig};
//!
//! let config = RenderConfig::from_env().with_single_thread_threshold(20);
//! let output = OfdRenderer::new(config).render(documents);
//! std::fs::write("out.pdf", &output.bytes)?;
//! ```

pub mod chunking;
pub(crate) mod concurrency;
pub mod config;
mod orchestrator;

pub use chunking::{Chunk, PageSlot, page_slots, plan_chunks};
pub use self::config::{ChunkFailurePolicy, RenderConfig};
pub use orchestrator::{OfdRenderer, RenderOutput};
