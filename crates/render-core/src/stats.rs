use std::fmt;

/// Degradation counters for one render job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub pages_rendered: usize,
    /// Text runs drawn with a font other than the requested one.
    pub fallback_fonts: usize,
    /// Runs drawn glyph by glyph because their extent left the page.
    pub char_mode_runs: usize,
    /// Runs reduced to their CJK characters.
    pub stripped_runs: usize,
    pub decode_errors: usize,
    pub skipped_images: usize,
    pub skipped_seals: usize,
    pub dropped_chunks: usize,
}

impl RenderStats {
    pub fn merge(&mut self, other: &RenderStats) {
        self.pages_rendered += other.pages_rendered;
        self.fallback_fonts += other.fallback_fonts;
        self.char_mode_runs += other.char_mode_runs;
        self.stripped_runs += other.stripped_runs;
        self.decode_errors += other.decode_errors;
        self.skipped_images += other.skipped_images;
        self.skipped_seals += other.skipped_seals;
        self.dropped_chunks += other.dropped_chunks;
    }

    /// True when nothing had to be degraded.
    pub fn is_clean(&self) -> bool {
        *self
            == RenderStats {
                pages_rendered: self.pages_rendered,
                ..Default::default()
            }
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pages={} fallback_fonts={} char_mode_runs={} stripped_runs={} decode_errors={} \
             skipped_images={} skipped_seals={} dropped_chunks={}",
            self.pages_rendered,
            self.fallback_fonts,
            self.char_mode_runs,
            self.stripped_runs,
            self.decode_errors,
            self.skipped_images,
            self.skipped_seals,
            self.dropped_chunks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_counters() {
        let mut total = RenderStats { pages_rendered: 3, fallback_fonts: 1, ..Default::default() };
        total.merge(&RenderStats { pages_rendered: 2, skipped_seals: 1, ..Default::default() });
        assert_eq!(total.pages_rendered, 5);
        assert_eq!(total.fallback_fonts, 1);
        assert_eq!(total.skipped_seals, 1);
        assert!(!total.is_clean());
        assert!(RenderStats { pages_rendered: 9, ..Default::default() }.is_clean());
    }
}
