//! Chunk rendering and fan-out.
//!
//! Every chunk owns its canvas and image cache; only the document model,
//! the font registry snapshot and the page renderer are shared.

use crate::pipeline::chunking::Chunk;
use log::{debug, warn};
use ofdrender_executor::Executor;
use ofdrender_render_core::{RenderError, RenderStats};
use ofdrender_render_lopdf::{Canvas, FontRegistry, PageRenderer};
use ofdrender_types::Document;
use std::any::Any;
use std::fs;
use std::io::Cursor;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

static SPILL_JOBS: AtomicUsize = AtomicUsize::new(0);

/// Everything a chunk task needs, cheap to clone into each worker.
#[derive(Debug, Clone)]
pub(crate) struct ChunkJob {
    documents: Arc<[Document]>,
    fonts: Arc<FontRegistry>,
    renderer: PageRenderer,
    spill: Option<(PathBuf, usize)>,
}

impl ChunkJob {
    pub(crate) fn new(documents: Arc<[Document]>, fonts: Arc<FontRegistry>, renderer: PageRenderer) -> Self {
        Self { documents, fonts, renderer, spill: None }
    }

    /// Finished chunks are written into `dir` until they are merged.
    pub(crate) fn with_spill_dir(mut self, dir: &Path) -> Self {
        let job = SPILL_JOBS.fetch_add(1, Ordering::Relaxed);
        self.spill = Some((dir.to_path_buf(), job));
        self
    }

    /// Renders `chunk` into a sub-document of its own.
    pub(crate) fn render(&self, chunk: &Chunk) -> Result<ChunkOutput, RenderError> {
        let mut canvas = Canvas::new(Cursor::new(Vec::new()), Arc::clone(&self.fonts))?;
        let mut stats = RenderStats::default();

        for (position, slot) in chunk.slots.iter().enumerate() {
            let document = self.documents.get(slot.doc).ok_or_else(|| {
                RenderError::Other(format!("chunk {} names unknown document {}", chunk.index, slot.doc))
            })?;
            let page = document.pages.get(slot.page).ok_or_else(|| {
                RenderError::Other(format!("chunk {} names unknown page {}", chunk.index, slot.page))
            })?;
            self.renderer.render_page(
                &mut canvas,
                document,
                slot.doc,
                page,
                chunk.breaks_after(position),
                &mut stats,
            )?;
        }

        let page_count = chunk.slots.len();
        let bytes = canvas.save()?.into_inner();
        debug!("[SCHEDULER] Chunk {} rendered {} pages ({} bytes)", chunk.index, page_count, bytes.len());

        let body = match &self.spill {
            Some((dir, job)) => ChunkBody::Spilled(SpilledChunk::write(dir, *job, chunk.index, &bytes)?),
            None => ChunkBody::Memory(bytes),
        };
        Ok(ChunkOutput { index: chunk.index, body, page_count, stats })
    }
}

/// A finished sub-document.
#[derive(Debug)]
pub(crate) struct ChunkOutput {
    pub index: usize,
    pub body: ChunkBody,
    pub page_count: usize,
    pub stats: RenderStats,
}

#[derive(Debug)]
pub(crate) enum ChunkBody {
    Memory(Vec<u8>),
    Spilled(SpilledChunk),
}

impl ChunkBody {
    pub(crate) fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        match self {
            ChunkBody::Memory(bytes) => Ok(bytes),
            ChunkBody::Spilled(file) => Ok(fs::read(file.path())?),
        }
    }

    pub(crate) fn load(self) -> Result<lopdf::Document, RenderError> {
        let bytes = self.into_bytes()?;
        Ok(lopdf::Document::load_mem(&bytes)?)
    }
}

/// A chunk written to the cache directory; the file goes away on drop.
#[derive(Debug)]
pub(crate) struct SpilledChunk {
    path: PathBuf,
}

impl SpilledChunk {
    fn write(dir: &Path, job: usize, index: usize, bytes: &[u8]) -> Result<Self, RenderError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("chunk-{}-{}-{}.pdf", std::process::id(), job, index));
        fs::write(&path, bytes)?;
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SpilledChunk {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("[SCHEDULER] Could not remove spilled chunk {}: {}", self.path.display(), e);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "chunk task panicked".to_string()
    }
}

/// Renders all chunks on `executor` and returns the outcomes sorted by chunk
/// index. Failed and panicking chunks come back as `ChunkRenderFailure`.
pub(crate) fn run_chunks<E: Executor>(
    executor: &E,
    job: &ChunkJob,
    chunks: Vec<Chunk>,
) -> Vec<Result<ChunkOutput, RenderError>> {
    let job = job.clone();
    let mut results = executor.execute_all(chunks, move |chunk| {
        let index = chunk.index;
        let outcome = match catch_unwind(AssertUnwindSafe(|| job.render(&chunk))) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(panic_message(payload)),
        };
        (index, outcome.map_err(|message| RenderError::ChunkRenderFailure { index, message }))
    });
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, outcome)| outcome).collect()
}
