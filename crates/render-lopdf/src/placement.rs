//! Where raster images land on the page.

use crate::canvas::{Canvas, ImageHandle};
use crate::images::{PdfImage, is_supported_format};
use log::{debug, warn};
use ofdrender_render_core::{PT_PER_MM, RenderError, RenderStats, mm_to_pt};
use ofdrender_types::{Boundary, Ctm, Document, ImageRef, ImageResource};
use std::io::{Seek, Write};

/// Which placement rule produced a [`Placement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    /// Full-page image positioned by its CTM.
    FullPageCtm,
    /// Anchored at `pos` shifted by the wrapping appearance box.
    Wrapped,
    Direct,
}

/// Destination rectangle in points, lower-left corner first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub kind: PlacementKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Builds a placement from its top-left corner; the page grows downwards
    /// in the model, so the rectangle hangs below `top`.
    fn from_top(kind: PlacementKind, x: f32, top: f32, width: f32, height: f32) -> Self {
        Self { kind, x, y: top - height, width, height }
    }
}

/// Computes the destination of `image` on `page`. `natural` is the decoded
/// size in pixels, only consulted by the CTM rule.
pub fn place(image: &ImageRef, page: &Boundary, natural: (u32, u32)) -> Placement {
    let pos = image.pos;
    match (image.ctm, image.wrap_pos) {
        (Some(ctm), None) if pos.approx_eq(page) => {
            // CTM scale components are in tenths of the pixel unit here;
            // the translation is applied separately against the page.
            let extent = Ctm { a: ctm.a / 10.0, d: ctm.d / 10.0, e: 0.0, f: 0.0, ..ctm };
            let (w, h) = extent.apply(natural.0 as f32, natural.1 as f32);
            let width = w.min(pos.width * PT_PER_MM);
            let height = h.min(pos.height * PT_PER_MM);
            Placement::from_top(
                PlacementKind::FullPageCtm,
                mm_to_pt(pos.x + ctm.e),
                mm_to_pt(page.height - ctm.f),
                width,
                height,
            )
        }
        (_, Some(wrap)) => Placement::from_top(
            PlacementKind::Wrapped,
            mm_to_pt(pos.x + wrap.x),
            mm_to_pt(page.height - pos.y - wrap.y),
            mm_to_pt(pos.width),
            mm_to_pt(pos.height),
        ),
        _ => place_at_boundary(&pos, page),
    }
}

/// Direct placement of a box, as used for seals.
pub fn place_at_boundary(boundary: &Boundary, page: &Boundary) -> Placement {
    Placement::from_top(
        PlacementKind::Direct,
        mm_to_pt(boundary.x),
        mm_to_pt(page.height - boundary.y),
        mm_to_pt(boundary.width),
        mm_to_pt(boundary.height),
    )
}

/// Decodes (once per canvas) and registers the resource behind `key`.
fn load_image<W: Write + Seek>(
    canvas: &mut Canvas<W>,
    key: &str,
    bytes: &[u8],
    stats: &mut RenderStats,
) -> Option<ImageHandle> {
    match canvas.cached_image(key) {
        Some(Some(handle)) => return Some(handle.clone()),
        Some(None) => return None,
        None => {}
    }
    let registered = PdfImage::decode(bytes).and_then(|image| canvas.register_image(key, &image));
    match registered {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("[IMAGE] Image '{}' could not be embedded: {}", key, e);
            stats.decode_errors += 1;
            canvas.mark_image_failed(key);
            None
        }
    }
}

/// Looks up a drawable image resource. Unknown ids, unsupported formats and
/// empty payloads are `ResourceMissing`.
pub fn resolve_resource<'a>(document: &'a Document, id: &str) -> Result<&'a ImageResource, RenderError> {
    let resource = document
        .image(id)
        .ok_or_else(|| RenderError::ResourceMissing(format!("unknown image resource '{}'", id)))?;
    let format = resource.declared_format();
    if !is_supported_format(&format) {
        return Err(RenderError::ResourceMissing(format!(
            "image resource '{}' has unsupported format '{}'",
            id, format
        )));
    }
    if resource.data.is_empty() {
        return Err(RenderError::ResourceMissing(format!("image resource '{}' is empty", id)));
    }
    Ok(resource)
}

/// Draws one image reference. Anything unusable skips this image only.
pub fn draw_image_ref<W: Write + Seek>(
    canvas: &mut Canvas<W>,
    document: &Document,
    doc_index: usize,
    image: &ImageRef,
    page: &Boundary,
    stats: &mut RenderStats,
) {
    let resource = match resolve_resource(document, &image.resource_id) {
        Ok(resource) => resource,
        Err(e) => {
            warn!("[IMAGE] Skipping image: {}", e);
            stats.skipped_images += 1;
            return;
        }
    };

    // Resource ids are only unique within their document.
    let key = format!("{}/{}", doc_index, resource.id);
    let Some(handle) = load_image(canvas, &key, &resource.data, stats) else {
        stats.skipped_images += 1;
        return;
    };
    let placement = place(image, page, handle.dimensions());
    debug!("[IMAGE] '{}' placed via {:?} at {:?}", key, placement.kind, placement);
    canvas.draw_image(&handle, placement.x, placement.y, placement.width, placement.height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_canvas, page_operations, png_bytes};
    use std::sync::Arc;

    fn a4() -> Boundary {
        Boundary::new(0.0, 0.0, 210.0, 297.0)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn full_page_ctm_branch_is_taken_for_page_sized_pos() {
        let image = ImageRef {
            resource_id: "1".into(),
            pos: a4(),
            ctm: Some(Ctm::from_slice(&[10.0, 0.0, 0.0, 10.0, 5.0, 7.0]).unwrap()),
            wrap_pos: None,
        };
        let p = place(&image, &a4(), (100, 50));
        assert_eq!(p.kind, PlacementKind::FullPageCtm);
        assert!(close(p.x, mm_to_pt(5.0)));
        assert!(close(p.width, 100.0));
        assert!(close(p.height, 50.0));
        assert!(close(p.y, mm_to_pt(290.0) - 50.0));
    }

    #[test]
    fn full_page_ctm_size_is_clipped_to_pos() {
        let image = ImageRef {
            resource_id: "1".into(),
            pos: a4(),
            ctm: Some(Ctm::from_slice(&[100.0, 0.0, 0.0, 100.0, 0.0, 0.0]).unwrap()),
            wrap_pos: None,
        };
        let p = place(&image, &a4(), (5000, 8000));
        assert!(close(p.width, mm_to_pt(210.0)));
        assert!(close(p.height, mm_to_pt(297.0)));
    }

    #[test]
    fn ctm_on_smaller_box_uses_direct_rule() {
        let image = ImageRef {
            resource_id: "1".into(),
            pos: Boundary::new(10.0, 20.0, 30.0, 40.0),
            ctm: Some(Ctm::IDENTITY),
            wrap_pos: None,
        };
        let p = place(&image, &a4(), (1, 1));
        assert_eq!(p.kind, PlacementKind::Direct);
        assert!(close(p.x, mm_to_pt(10.0)));
        assert!(close(p.y, mm_to_pt(297.0 - 20.0 - 40.0)));
        assert!(close(p.width, mm_to_pt(30.0)));
    }

    #[test]
    fn wrap_pos_offsets_the_anchor() {
        let image = ImageRef {
            resource_id: "1".into(),
            pos: Boundary::new(10.0, 20.0, 30.0, 40.0),
            ctm: Some(Ctm::IDENTITY),
            wrap_pos: Some(Boundary::new(1.0, 2.0, 5.0, 5.0)),
        };
        let p = place(&image, &a4(), (1, 1));
        assert_eq!(p.kind, PlacementKind::Wrapped);
        assert!(close(p.x, mm_to_pt(11.0)));
        assert!(close(p.y, mm_to_pt(297.0 - 22.0 - 40.0)));
        assert!(close(p.height, mm_to_pt(40.0)));
    }

    fn doc_with(format: &str, data: Vec<u8>) -> Document {
        let mut doc = Document::default();
        doc.images.push(ImageResource {
            id: "1".into(),
            format: format.into(),
            file_name: None,
            data: Arc::new(data),
        });
        doc
    }

    fn image_ref() -> ImageRef {
        ImageRef { resource_id: "1".into(), pos: Boundary::new(10.0, 10.0, 20.0, 20.0), ..Default::default() }
    }

    #[test]
    fn sheared_full_page_ctm_mixes_both_axes() {
        let image = ImageRef {
            resource_id: "1".into(),
            pos: a4(),
            ctm: Some(Ctm::from_slice(&[10.0, 0.5, 0.25, 20.0, 0.0, 0.0]).unwrap()),
            wrap_pos: None,
        };
        let p = place(&image, &a4(), (40, 20));
        assert_eq!(p.kind, PlacementKind::FullPageCtm);
        assert!(close(p.width, 40.0 + 0.25 * 20.0));
        assert!(close(p.height, 0.5 * 40.0 + 2.0 * 20.0));
    }

    #[test]
    fn resolve_reports_missing_resources() {
        let doc = doc_with("png", png_bytes(1, 1));
        assert_eq!(resolve_resource(&doc, "1").unwrap().id, "1");
        assert!(matches!(resolve_resource(&doc, "404"), Err(RenderError::ResourceMissing(_))));
        let gif = doc_with("GIF", png_bytes(1, 1));
        assert!(matches!(resolve_resource(&gif, "1"), Err(RenderError::ResourceMissing(_))));
        let empty = doc_with("PNG", Vec::new());
        assert!(matches!(resolve_resource(&empty, "1"), Err(RenderError::ResourceMissing(_))));
    }

    #[test]
    fn same_resource_is_decoded_once_per_canvas() {
        let doc = doc_with("png", png_bytes(4, 4));
        let mut canvas = new_canvas();
        let mut stats = RenderStats::default();
        draw_image_ref(&mut canvas, &doc, 0, &image_ref(), &a4(), &mut stats);
        draw_image_ref(&mut canvas, &doc, 0, &image_ref(), &a4(), &mut stats);
        assert!(stats.is_clean());
        let ops = page_operations(canvas, 1);
        let draws: Vec<_> = ops.iter().filter(|o| o.operator == "Do").collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].operands, draws[1].operands);
    }

    #[test]
    fn unknown_unsupported_and_corrupt_images_are_skipped() {
        let mut stats = RenderStats::default();
        let mut canvas = new_canvas();
        let missing = ImageRef { resource_id: "404".into(), ..image_ref() };
        draw_image_ref(&mut canvas, &doc_with("png", png_bytes(1, 1)), 0, &missing, &a4(), &mut stats);
        draw_image_ref(&mut canvas, &doc_with("GIF", png_bytes(1, 1)), 0, &image_ref(), &a4(), &mut stats);
        let corrupt = doc_with("JPG", vec![1, 2, 3]);
        draw_image_ref(&mut canvas, &corrupt, 0, &image_ref(), &a4(), &mut stats);
        draw_image_ref(&mut canvas, &corrupt, 0, &image_ref(), &a4(), &mut stats);
        assert_eq!(stats.skipped_images, 4);
        // The corrupt resource is decoded once, then remembered as failed.
        assert_eq!(stats.decode_errors, 1);
        let ops = page_operations(canvas, 1);
        assert!(ops.iter().all(|o| o.operator != "Do"));
    }
}
