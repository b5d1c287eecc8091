//! Reconstruction of OFD abbreviated path data.
//!
//! `"S 0 0 L 10 0 L 10 10 C"` is tokenized into `{mode, operands}` records,
//! assembled into segments in page millimetres, and finally emitted as PDF
//! path operators after the page flip.

use crate::canvas::{Canvas, PaintMode};
use log::warn;
use ofdrender_render_core::{RenderError, RenderStats, mm_to_pt, to_pdf_point};
use ofdrender_types::{Boundary, Color, PathOp};
use std::f64::consts::{FRAC_PI_2, PI};
use std::io::{Seek, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// `S x y`: sets the sub-path start.
    Start,
    /// `M x y`
    Move,
    /// `L x y`
    Line,
    /// `Q x1 y1 x y`
    Quadratic,
    /// `B x1 y1 x2 y2 x y`
    Cubic,
    /// `A rx ry angle large sweep x y`
    Arc,
    /// `C`: closes the sub-path.
    Close,
}

impl PathMode {
    fn from_marker(token: &str) -> Option<Self> {
        Some(match token {
            "S" => PathMode::Start,
            "M" => PathMode::Move,
            "L" => PathMode::Line,
            "Q" => PathMode::Quadratic,
            "B" => PathMode::Cubic,
            "A" => PathMode::Arc,
            "C" => PathMode::Close,
            _ => return None,
        })
    }

    fn operand_count(self) -> usize {
        match self {
            PathMode::Start | PathMode::Move | PathMode::Line => 2,
            PathMode::Quadratic => 4,
            PathMode::Cubic => 6,
            PathMode::Arc => 7,
            PathMode::Close => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub mode: PathMode,
    pub operands: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() < 1e-4 && (self.y - other.y).abs() < 1e-4
    }
}

/// A drawable path segment in the path's local millimetre space.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    ArcTo { rx: f32, ry: f32, rotation: f32, large_arc: bool, sweep: bool, to: Point },
    /// Back to the sub-path start.
    Close { to: Point },
}

/// Splits abbreviated data into mode records.
pub fn tokenize(data: &str) -> Result<Vec<PathCommand>, RenderError> {
    let mut commands: Vec<PathCommand> = Vec::new();
    for token in data.split_whitespace() {
        if let Some(mode) = PathMode::from_marker(token) {
            commands.push(PathCommand { mode, operands: Vec::new() });
            continue;
        }
        let value = token
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RenderError::Decode(format!("invalid path token '{}'", token)))?;
        match commands.last_mut() {
            Some(command) => command.operands.push(value),
            None => {
                return Err(RenderError::Decode(format!("operand '{}' before any path operator", token)));
            }
        }
    }
    Ok(commands)
}

/// Turns mode records into segments, tracking the pen and sub-path start.
pub fn assemble(commands: &[PathCommand]) -> Result<Vec<Segment>, RenderError> {
    let mut segments = Vec::with_capacity(commands.len());
    let mut start: Option<Point> = None;
    let mut current: Option<Point> = None;

    for command in commands {
        let ops = &command.operands;
        if ops.len() != command.mode.operand_count() {
            return Err(RenderError::Decode(format!(
                "{:?} takes {} operands, got {}",
                command.mode,
                command.mode.operand_count(),
                ops.len()
            )));
        }
        let end = |i: usize| Point::new(ops[i], ops[i + 1]);
        match command.mode {
            PathMode::Start => {
                let p = end(0);
                start = Some(p);
                current = Some(p);
                segments.push(Segment::MoveTo(p));
            }
            PathMode::Move => {
                let p = end(0);
                start.get_or_insert(p);
                current = Some(p);
                segments.push(Segment::MoveTo(p));
            }
            PathMode::Close => {
                if let Some(to) = start {
                    segments.push(Segment::Close { to });
                    current = Some(to);
                }
            }
            mode => {
                if current.is_none() {
                    return Err(RenderError::Decode(format!("{:?} without a current point", mode)));
                }
                let segment = match mode {
                    PathMode::Line => Segment::LineTo(end(0)),
                    PathMode::Quadratic => Segment::QuadTo { ctrl: end(0), to: end(2) },
                    PathMode::Cubic => Segment::CubicTo { ctrl1: end(0), ctrl2: end(2), to: end(4) },
                    _ => Segment::ArcTo {
                        rx: ops[0],
                        ry: ops[1],
                        rotation: ops[2],
                        large_arc: ops[3] != 0.0,
                        sweep: ops[4] != 0.0,
                        to: end(5),
                    },
                };
                current = Some(match &segment {
                    Segment::LineTo(to)
                    | Segment::QuadTo { to, .. }
                    | Segment::CubicTo { to, .. }
                    | Segment::ArcTo { to, .. } => *to,
                    _ => end(0),
                });
                segments.push(segment);
            }
        }
    }
    Ok(segments)
}

/// How an elliptical arc is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum ArcShape {
    /// Start and end coincide.
    Nothing,
    /// A radius is zero.
    Line,
    /// Cubic pieces `[ctrl1, ctrl2, end]`, each spanning at most 90 degrees.
    Cubics(Vec<[Point; 3]>),
}

/// Endpoint-parameterised elliptical arc to cubic beziers.
pub fn arc_to_cubics(
    from: Point,
    rx: f32,
    ry: f32,
    rotation_deg: f32,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> ArcShape {
    if from.approx_eq(to) {
        return ArcShape::Nothing;
    }
    let (mut rx, mut ry) = (f64::from(rx).abs(), f64::from(ry).abs());
    if rx < 1e-9 || ry < 1e-9 {
        return ArcShape::Line;
    }
    let (x1, y1, x2, y2) = (f64::from(from.x), f64::from(from.y), f64::from(to.x), f64::from(to.y));
    let phi = f64::from(rotation_deg).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (x1 - x2) / 2.0;
    let dy2 = (y1 - y2) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;
    let cx = cos_phi * cxp - sin_phi * cyp + (x1 + x2) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (y1 + y2) / 2.0;

    let angle = |ux: f64, uy: f64, vx: f64, vy: f64| (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;
    let theta1 = angle(1.0, 0.0, ux, uy);
    let mut dtheta = angle(ux, uy, vx, vy);
    if !sweep && dtheta > 0.0 {
        dtheta -= 2.0 * PI;
    } else if sweep && dtheta < 0.0 {
        dtheta += 2.0 * PI;
    }

    let pieces = (dtheta.abs() / FRAC_PI_2 - 1e-9).ceil().max(1.0) as usize;
    let delta = dtheta / pieces as f64;
    let t = 4.0 / 3.0 * (delta / 4.0).tan();

    let on_ellipse = |a: f64| {
        let (sin_a, cos_a) = a.sin_cos();
        (
            cx + rx * cos_a * cos_phi - ry * sin_a * sin_phi,
            cy + rx * cos_a * sin_phi + ry * sin_a * cos_phi,
        )
    };
    let tangent = |a: f64| {
        let (sin_a, cos_a) = a.sin_cos();
        (
            -rx * sin_a * cos_phi - ry * cos_a * sin_phi,
            -rx * sin_a * sin_phi + ry * cos_a * cos_phi,
        )
    };
    let point = |x: f64, y: f64| Point::new(x as f32, y as f32);

    let mut cubics = Vec::with_capacity(pieces);
    for i in 0..pieces {
        let a1 = theta1 + delta * i as f64;
        let a2 = a1 + delta;
        let (p1x, p1y) = on_ellipse(a1);
        let (p2x, p2y) = if i + 1 == pieces { (x2, y2) } else { on_ellipse(a2) };
        let (d1x, d1y) = tangent(a1);
        let (d2x, d2y) = tangent(a2);
        cubics.push([
            point(p1x + t * d1x, p1y + t * d1y),
            point(p2x - t * d2x, p2y - t * d2y),
            point(p2x, p2y),
        ]);
    }
    ArcShape::Cubics(cubics)
}

/// Writes segments to the canvas through `map` (local mm to page points).
pub fn emit_segments<W, F>(canvas: &mut Canvas<W>, segments: &[Segment], map: F)
where
    W: Write + Seek,
    F: Fn(Point) -> (f32, f32),
{
    let mut current = Point::new(0.0, 0.0);
    let mut last_move: Option<Point> = None;
    for segment in segments {
        match *segment {
            Segment::MoveTo(p) => {
                let (x, y) = map(p);
                canvas.move_to(x, y);
                last_move = Some(p);
                current = p;
            }
            Segment::LineTo(p) => {
                let (x, y) = map(p);
                canvas.line_to(x, y);
                current = p;
            }
            Segment::QuadTo { ctrl, to } => {
                let (cx, cy) = map(ctrl);
                let (x, y) = map(to);
                canvas.curve_to(cx, cy, cx, cy, x, y);
                current = to;
            }
            Segment::CubicTo { ctrl1, ctrl2, to } => {
                let (x1, y1) = map(ctrl1);
                let (x2, y2) = map(ctrl2);
                let (x, y) = map(to);
                canvas.curve_to(x1, y1, x2, y2, x, y);
                current = to;
            }
            Segment::ArcTo { rx, ry, rotation, large_arc, sweep, to } => {
                match arc_to_cubics(current, rx, ry, rotation, large_arc, sweep, to) {
                    ArcShape::Nothing => {}
                    ArcShape::Line => {
                        let (x, y) = map(to);
                        canvas.line_to(x, y);
                    }
                    ArcShape::Cubics(cubics) => {
                        for [c1, c2, end] in cubics {
                            let (x1, y1) = map(c1);
                            let (x2, y2) = map(c2);
                            let (x, y) = map(end);
                            canvas.curve_to(x1, y1, x2, y2, x, y);
                        }
                    }
                }
                current = to;
            }
            Segment::Close { to } => {
                if last_move.is_some_and(|m| m.approx_eq(to)) {
                    canvas.close_path();
                } else {
                    let (x, y) = map(to);
                    canvas.line_to(x, y);
                }
                current = to;
            }
        }
    }
}

fn line_width_pt(raw: &str) -> Result<f32, RenderError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(mm_to_pt(0.25));
    }
    match compact.parse::<f32>() {
        Ok(w) if w.is_finite() && w >= 0.0 => Ok(mm_to_pt(w)),
        _ => Err(RenderError::Decode(format!("invalid line width '{}'", raw))),
    }
}

/// Draws one path record. Malformed data skips the path, never the page.
pub fn draw_path<W: Write + Seek>(
    canvas: &mut Canvas<W>,
    path: &PathOp,
    page: &Boundary,
    stats: &mut RenderStats,
) {
    let segments = match tokenize(&path.data).and_then(|commands| assemble(&commands)) {
        Ok(segments) => segments,
        Err(e) => {
            warn!("[PATH] Skipping path '{}': {}", path.data, e);
            stats.decode_errors += 1;
            return;
        }
    };
    if segments.is_empty() {
        return;
    }

    let line_width = line_width_pt(&path.line_width).unwrap_or_else(|e| {
        warn!("[PATH] {}; using 0.25", e);
        stats.decode_errors += 1;
        mm_to_pt(0.25)
    });
    // OFD producers commonly put the stroke colour in FillColor only.
    let stroke = path.stroke_color.or(path.fill_color).unwrap_or(Color::BLACK);
    let fill = path.fill_color.unwrap_or(Color::BLACK);
    canvas.set_line_width(line_width);
    canvas.set_stroke_color(stroke);
    if path.fill {
        canvas.set_fill_color(fill);
    }

    let origin = path.pos;
    let page_height = page.height;
    emit_segments(canvas, &segments, |p| {
        to_pdf_point(origin.x + p.x, origin.y + p.y, page_height)
    });
    canvas.paint(PaintMode::from_flags(path.stroke, path.fill));
}
