//! Text layout: glyph coordinates, whole-run vs per-glyph drawing, and the
//! font substitution cascade.

use crate::canvas::Canvas;
use crate::fonts::{EncodedText, FontRegistry};
use log::{debug, warn};
use ofdrender_render_core::{
    DrawOptions, RenderError, RenderMode, RenderStats, TextMismatchPolicy, axis_positions, mm_to_pt, parse_offset,
    to_pdf_point,
};
use ofdrender_types::{Axis, Boundary, Ctm, Document, TextRun};
use std::io::{Seek, Write};

/// Result of running the cascade for one string.
struct Selected {
    face_index: usize,
    encoded: EncodedText,
    substituted: bool,
}

/// Tries each candidate until one can encode `text`; the default face draws
/// whatever is left with placeholders.
fn select_face(registry: &FontRegistry, requested: &str, text: &str, limit: usize) -> Selected {
    for name in registry.candidates(requested, limit) {
        let Some((face_index, face)) = registry.face(name) else {
            continue;
        };
        if let Some(encoded) = face.encode(text) {
            return Selected { face_index, encoded, substituted: name != requested };
        }
        debug!("[TEXT] '{}' cannot encode {:?}, trying next font", name, text);
    }
    let (face_index, face) = registry.default_face();
    warn!("[TEXT] No font encodes {:?}; drawing with '{}' and placeholders", text, face.name());
    Selected { face_index, encoded: face.encode_lossy(text), substituted: true }
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Glyph coordinates along one axis. A bad delta rule degrades to the run's
/// start point only.
fn glyph_positions(
    origin: f32,
    offset: &str,
    delta_rule: &str,
    glyph_count: usize,
    ctm: Option<&Ctm>,
    axis: Axis,
    stats: &mut RenderStats,
) -> Vec<f32> {
    match axis_positions(origin, offset, delta_rule, glyph_count, ctm, axis) {
        Ok(positions) => positions,
        Err(e) => {
            warn!("[TEXT] {:?} positions: {}; keeping the start point only", axis, e);
            stats.decode_errors += 1;
            let (scale, shift) = ctm.map_or((1.0, 0.0), |m| (m.scale(axis), m.translation(axis)));
            vec![origin + (parse_offset(offset).unwrap_or(0.0) + shift) * scale]
        }
    }
}

/// Fails with `BoundsViolation` when the glyph position (mm, top-left
/// origin) lies left of, above, right of or below the page.
pub fn check_in_page(x: f32, y: f32, page: &Boundary) -> Result<(), RenderError> {
    let outside = mm_to_pt(x) > mm_to_pt(page.width)
        || mm_to_pt(y) > mm_to_pt(page.height)
        || x < 0.0
        || y < 0.0;
    if outside {
        return Err(RenderError::BoundsViolation(format!(
            "glyph at ({}, {}) mm is outside the {}x{} mm page",
            x, y, page.width, page.height
        )));
    }
    Ok(())
}

/// Draws one text run onto the current page.
pub fn draw_text_run<W: Write + Seek>(
    canvas: &mut Canvas<W>,
    document: &Document,
    run: &TextRun,
    page: &Boundary,
    options: &DrawOptions,
    stats: &mut RenderStats,
) {
    if run.text.trim().is_empty() {
        return;
    }

    let requested = document.font(&run.font).map(|f| f.normalized_name()).unwrap_or_default();
    let resolved = canvas.fonts().resolve(&requested).to_string();
    let mut fell_back = !canvas.fonts().contains(&requested);
    if fell_back {
        debug!("[TEXT] Font '{}' (id '{}') resolved to '{}'", requested, run.font, resolved);
    }

    let ctm = run.ctm.as_ref();
    let size = mm_to_pt(run.size) * ctm.map_or(1.0, |m| m.d);
    let glyph_count = run.text.chars().count();
    let xs = glyph_positions(run.pos.x, &run.x_offset, &run.delta_x, glyph_count, ctm, Axis::X, stats);
    let ys = glyph_positions(run.pos.y, &run.y_offset, &run.delta_y, glyph_count, ctm, Axis::Y, stats);

    let mut text = run.text.clone();
    if glyph_count > xs.len() || glyph_count > ys.len() {
        match options.text_mismatch_policy {
            TextMismatchPolicy::StripNonCjk => {
                text = text.chars().filter(|c| is_cjk_ideograph(*c)).collect();
                stats.stripped_runs += 1;
                warn!("[TEXT] {:?} has fewer coordinates than glyphs; kept CJK only", run.text);
                if text.is_empty() {
                    return;
                }
            }
            TextMismatchPolicy::DrawPositioned => {
                warn!("[TEXT] {:?} has fewer coordinates than glyphs", run.text);
            }
        }
    }

    let (Some(&first_x), Some(&first_y), Some(&last_x), Some(&last_y)) =
        (xs.first(), ys.first(), xs.last(), ys.last())
    else {
        return;
    };
    let outside_page = match check_in_page(last_x, last_y, page) {
        Ok(()) => false,
        Err(e) => {
            debug!("[TEXT] {:?}: {}", text, e);
            true
        }
    };

    canvas.set_fill_color(run.color);
    canvas.set_stroke_color(run.color);

    if options.render_mode == RenderMode::Line && !outside_page {
        let selected = select_face(canvas.fonts(), &resolved, &text, options.font_fallback_limit);
        fell_back |= selected.substituted;
        let (x, y) = to_pdf_point(first_x, first_y, page.height);
        canvas.draw_text(selected.face_index, size, x, y, &selected.encoded);
    } else {
        if options.render_mode == RenderMode::Line {
            debug!("[TEXT] Drawing {:?} glyph by glyph", text);
            stats.char_mode_runs += 1;
        }
        let mut buf = [0u8; 4];
        for (i, c) in text.chars().enumerate() {
            let (Some(&x), Some(&y)) = (xs.get(i), ys.get(i)) else {
                debug!("[TEXT] No position for {:?} in {:?}", c, text);
                continue;
            };
            let glyph = c.encode_utf8(&mut buf);
            let selected = select_face(canvas.fonts(), &resolved, glyph, options.font_fallback_limit);
            fell_back |= selected.substituted;
            let (x, y) = to_pdf_point(x, y, page.height);
            canvas.draw_text(selected.face_index, size, x, y, &selected.encoded);
        }
    }

    if fell_back {
        stats.fallback_fonts += 1;
    }
}
