//! Per-page orchestration in fixed z-order.

use crate::canvas::Canvas;
use crate::overlay::{draw_annotations, draw_signatures};
use crate::path::draw_path;
use crate::placement::draw_image_ref;
use crate::text::draw_text_run;
use log::debug;
use ofdrender_render_core::{DrawOptions, RenderError, RenderStats, mm_to_pt};
use ofdrender_traits::seal::SealExtractor;
use ofdrender_types::{Document, Page};
use std::io::{Seek, Write};
use std::sync::Arc;

/// Draws whole pages onto a canvas. Cheap to clone; one per chunk.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    options: DrawOptions,
    seals: Arc<dyn SealExtractor>,
}

impl PageRenderer {
    pub fn new(options: DrawOptions, seals: Arc<dyn SealExtractor>) -> Self {
        Self { options, seals }
    }

    pub fn options(&self) -> &DrawOptions {
        &self.options
    }

    /// Renders `page` of `document` (the `doc_index`-th unit of the job).
    ///
    /// Later layers paint over earlier ones: images, text, paths, seals,
    /// annotations. With `emit_break` the page is finished afterwards;
    /// otherwise it stays open for `Canvas::save`.
    pub fn render_page<W: Write + Seek>(
        &self,
        canvas: &mut Canvas<W>,
        document: &Document,
        doc_index: usize,
        page: &Page,
        emit_break: bool,
        stats: &mut RenderStats,
    ) -> Result<(), RenderError> {
        let size = document.page_size_for(page.index);
        debug!("[PAGE] Document {} page {} at {}", doc_index, page.index, size);
        canvas.set_page_size(mm_to_pt(size.width), mm_to_pt(size.height));

        for image in &page.images {
            draw_image_ref(canvas, document, doc_index, image, &size, stats);
        }
        for run in &page.texts {
            draw_text_run(canvas, document, run, &size, &self.options, stats);
        }
        for path in &page.paths {
            draw_path(canvas, path, &size, stats);
        }
        draw_signatures(
            canvas,
            document.signatures_for(page.index),
            self.seals.as_ref(),
            doc_index,
            page.index,
            &size,
            stats,
        );
        draw_annotations(
            canvas,
            document,
            document.annotations_for(page.index),
            doc_index,
            &size,
            stats,
        );

        stats.pages_rendered += 1;
        if emit_break {
            canvas.show_page()?;
        }
        Ok(())
    }
}
