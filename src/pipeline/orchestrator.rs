use super::chunking::{Chunk, page_slots, plan_chunks};
use super::concurrency::{ChunkJob, ChunkOutput, run_chunks};
use super::config::{ChunkFailurePolicy, RenderConfig};
use crate::error::OfdRenderError;
use crate::fallback::fallback_document;
use log::{debug, error, info, warn};
use ofdrender_executor::{Executor, ExecutorImpl, SyncExecutor};
use ofdrender_pdf_composer::merge_all;
use ofdrender_render_core::{RenderError, RenderStats};
use ofdrender_render_lopdf::{FontError, FontRegistry, PageRenderer};
use ofdrender_traits::{NoSealExtractor, SealExtractor};
use ofdrender_types::Document;
use std::sync::Arc;
use std::time::Instant;

/// The finished PDF plus what had to be degraded to get there.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub stats: RenderStats,
    /// True when `bytes` is the single-page error notice.
    pub is_fallback: bool,
}

/// Renders OFD document models to PDF.
///
/// Fonts are registered on `&mut self` before any fan-out; workers only ever
/// see an immutable snapshot of the registry.
#[derive(Debug)]
pub struct OfdRenderer {
    config: RenderConfig,
    fonts: Arc<FontRegistry>,
    seals: Arc<dyn SealExtractor>,
}

impl Default for OfdRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl OfdRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            fonts: Arc::new(FontRegistry::new()),
            seals: Arc::new(NoSealExtractor),
        }
    }

    pub fn with_seal_extractor(mut self, seals: Arc<dyn SealExtractor>) -> Self {
        self.seals = seals;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Registers a TrueType/OpenType program and returns its normalized name.
    pub fn register_font(&mut self, name: &str, data: Arc<Vec<u8>>) -> Result<String, FontError> {
        Arc::make_mut(&mut self.fonts).register(name, data)
    }

    fn register_embedded_fonts(&mut self, documents: &[Document]) {
        for font in documents.iter().flat_map(|d| d.fonts.iter()) {
            let Some(data) = &font.data else { continue };
            let name = font.normalized_name();
            if let Err(e) = self.register_font(&name, Arc::clone(data)) {
                warn!("[FONTS] Embedded font '{}' (id '{}') not registered: {}", name, font.id, e);
            }
        }
    }

    /// Renders every page of `documents`, in order, into one PDF.
    pub fn try_render(
        &mut self,
        documents: impl Into<Arc<[Document]>>,
    ) -> Result<RenderOutput, OfdRenderError> {
        let documents: Arc<[Document]> = documents.into();
        let started = Instant::now();
        self.register_embedded_fonts(&documents);

        let slots = page_slots(&documents);
        if slots.is_empty() {
            return Err(OfdRenderError::NoPages);
        }

        let renderer = PageRenderer::new(self.config.draw_options(), Arc::clone(&self.seals));
        let mut job = ChunkJob::new(Arc::clone(&documents), Arc::clone(&self.fonts), renderer);

        let sequential =
            self.config.force_single_thread() || slots.len() <= self.config.single_thread_threshold();
        let (outputs, mut stats) = if sequential {
            info!("[SCHEDULER] Rendering {} pages sequentially", slots.len());
            let whole = Chunk { index: 0, slots };
            let output = run_chunks(&SyncExecutor::new(), &job, vec![whole])
                .into_iter()
                .next()
                .ok_or(OfdRenderError::NoPages)??;
            let stats = output.stats.clone();
            (vec![output], stats)
        } else {
            if self.config.use_cache() {
                job = job.with_spill_dir(self.config.cache_dir());
            }
            let chunks = plan_chunks(&slots, self.config.pages_per_chunk());
            let workers = self.config.worker_limit().min(chunks.len()).max(1);
            let executor = ExecutorImpl::for_workers(workers);
            info!(
                "[SCHEDULER] Rendering {} pages in {} chunks on {} ({} workers)",
                slots.len(),
                chunks.len(),
                executor.name(),
                executor.parallelism()
            );
            self.collect(run_chunks(&executor, &job, chunks))?
        };

        let (bytes, page_count) = assemble(outputs)?;
        stats.pages_rendered = page_count;
        info!(
            "[SCHEDULER] Rendered {} pages in {:.2?}: {}",
            page_count,
            started.elapsed(),
            stats
        );
        Ok(RenderOutput { bytes, page_count, stats, is_fallback: false })
    }

    /// Applies the chunk failure policy and sums the per-chunk counters.
    fn collect(
        &self,
        results: Vec<Result<ChunkOutput, RenderError>>,
    ) -> Result<(Vec<ChunkOutput>, RenderStats), OfdRenderError> {
        let mut stats = RenderStats::default();
        let mut outputs = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(output) => {
                    stats.merge(&output.stats);
                    outputs.push(output);
                }
                Err(e) => match self.config.chunk_failure_policy() {
                    ChunkFailurePolicy::DropChunk => {
                        warn!("[SCHEDULER] {}; its pages are left out", e);
                        stats.dropped_chunks += 1;
                    }
                    ChunkFailurePolicy::FailJob => {
                        error!("[SCHEDULER] {}; failing the job", e);
                        return Err(e.into());
                    }
                },
            }
        }
        if outputs.is_empty() {
            return Err(OfdRenderError::NoPages);
        }
        Ok((outputs, stats))
    }

    /// Like [`try_render`](Self::try_render) but never fails: any error yields
    /// the single-page notice document.
    pub fn render(&mut self, documents: impl Into<Arc<[Document]>>) -> RenderOutput {
        match self.try_render(documents) {
            Ok(output) => output,
            Err(e) => {
                error!("[SCHEDULER] Render failed, returning the fallback document: {}", e);
                RenderOutput {
                    bytes: fallback_document(),
                    page_count: 1,
                    stats: RenderStats::default(),
                    is_fallback: true,
                }
            }
        }
    }
}

/// Joins chunk sub-documents in chunk order. A single chunk is passed through.
fn assemble(mut outputs: Vec<ChunkOutput>) -> Result<(Vec<u8>, usize), OfdRenderError> {
    if outputs.len() == 1 {
        if let Some(output) = outputs.pop() {
            let page_count = output.page_count;
            return Ok((output.body.into_bytes()?, page_count));
        }
    }
    debug!("[SCHEDULER] Merging {} chunk documents", outputs.len());
    let parts = outputs
        .into_iter()
        .map(|output| output.body.load())
        .collect::<Result<Vec<_>, _>>()?;
    let mut merged = merge_all(parts)?;
    let page_count = merged.get_pages().len();
    let mut bytes = Vec::new();
    merged.save_to(&mut bytes)?;
    Ok((bytes, page_count))
}
