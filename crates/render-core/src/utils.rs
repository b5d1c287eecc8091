//! Unit conversion between the model (millimetres, Y down from the page top)
//! and PDF user space (points, Y up from the page bottom).

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Convert layout Y coordinate to PDF Y coordinate (flip origin)
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// Model point in millimetres to a PDF point on a page `page_height_mm` tall.
pub fn to_pdf_point(x_mm: f32, y_mm: f32, page_height_mm: f32) -> (f32, f32) {
    (mm_to_pt(x_mm), mm_to_pt(flip_y(y_mm, page_height_mm)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_a4_corners() {
        let (x, y) = to_pdf_point(0.0, 0.0, 297.0);
        assert_eq!(x, 0.0);
        assert!((y - 841.89).abs() < 0.01);
        let (x, y) = to_pdf_point(210.0, 297.0, 297.0);
        assert!((x - 595.28).abs() < 0.01);
        assert!(y.abs() < 1e-3);
    }
}
