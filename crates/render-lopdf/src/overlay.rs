//! Seal and stamp overlays drawn above the page content.

use crate::canvas::Canvas;
use crate::images::PdfImage;
use crate::placement::{draw_image_ref, place_at_boundary};
use log::{debug, info, warn};
use ofdrender_render_core::RenderStats;
use ofdrender_traits::seal::SealExtractor;
use ofdrender_types::{Annotation, Boundary, Document, Signature};
use std::io::{Seek, Write};

/// Places the first seal image of every signature at its boundary. A
/// signature that yields no image is skipped; the page still renders.
pub fn draw_signatures<W: Write + Seek>(
    canvas: &mut Canvas<W>,
    signatures: &[Signature],
    extractor: &dyn SealExtractor,
    doc_index: usize,
    page_index: usize,
    page: &Boundary,
    stats: &mut RenderStats,
) {
    for (n, signature) in signatures.iter().enumerate() {
        let images = match extractor.extract(&signature.signed_value) {
            Ok(images) => images,
            Err(e) => {
                warn!("[SEAL] Seal at {} could not be extracted: {}", signature.boundary, e);
                stats.skipped_seals += 1;
                continue;
            }
        };
        let Some(seal) = images.first() else {
            info!("[SEAL] No seal image found for signature at {}", signature.boundary);
            stats.skipped_seals += 1;
            continue;
        };

        let key = format!("seal/{}/{}/{}", doc_index, page_index, n);
        let handle = match PdfImage::from_dynamic(seal).and_then(|img| canvas.register_image(&key, &img)) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("[SEAL] Seal image could not be embedded: {}", e);
                stats.skipped_seals += 1;
                continue;
            }
        };
        let p = place_at_boundary(&signature.boundary, page);
        canvas.draw_image(&handle, p.x, p.y, p.width, p.height);
        debug!("[SEAL] Placed seal {} on page {}", n, page_index);
    }
}

/// Stamp annotations go through ordinary image placement; other kinds are
/// not drawn.
pub fn draw_annotations<W: Write + Seek>(
    canvas: &mut Canvas<W>,
    document: &Document,
    annotations: &[Annotation],
    doc_index: usize,
    page: &Boundary,
    stats: &mut RenderStats,
) {
    for annotation in annotations {
        match annotation.to_image_ref() {
            Some(image) => draw_image_ref(canvas, document, doc_index, &image, page, stats),
            None => debug!("[IMAGE] Ignoring '{}' annotation", annotation.kind),
        }
    }
}
