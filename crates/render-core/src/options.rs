use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// How text runs are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// One string per run while its extent stays on the page.
    #[default]
    Line,
    /// Always one draw per glyph.
    Char,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Line => "line",
            RenderMode::Char => "char",
        }
    }
}

impl FromStr for RenderMode {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(RenderMode::Line),
            "char" => Ok(RenderMode::Char),
            _ => Err(UnknownOption { kind: "render mode", value: s.to_string() }),
        }
    }
}

/// What to do with a run whose text is longer than its coordinate list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextMismatchPolicy {
    /// Draw the glyphs that have coordinates.
    #[default]
    DrawPositioned,
    /// Keep only CJK ideographs before drawing.
    StripNonCjk,
}

impl TextMismatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextMismatchPolicy::DrawPositioned => "draw-positioned",
            TextMismatchPolicy::StripNonCjk => "strip-non-cjk",
        }
    }
}

impl FromStr for TextMismatchPolicy {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "drawpositioned" => Ok(TextMismatchPolicy::DrawPositioned),
            "stripnoncjk" => Ok(TextMismatchPolicy::StripNonCjk),
            _ => Err(UnknownOption { kind: "text mismatch policy", value: s.to_string() }),
        }
    }
}

/// Per-page drawing knobs handed to every chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOptions {
    pub render_mode: RenderMode,
    pub text_mismatch_policy: TextMismatchPolicy,
    /// How many fallback-list entries the font cascade tries.
    pub font_fallback_limit: usize,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Line,
            text_mismatch_policy: TextMismatchPolicy::DrawPositioned,
            font_fallback_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes_and_policies() {
        assert_eq!("LINE".parse::<RenderMode>().unwrap(), RenderMode::Line);
        assert_eq!(" char ".parse::<RenderMode>().unwrap(), RenderMode::Char);
        assert!("word".parse::<RenderMode>().is_err());
        assert_eq!(
            "strip_non_cjk".parse::<TextMismatchPolicy>().unwrap(),
            TextMismatchPolicy::StripNonCjk
        );
        assert_eq!(
            "draw-positioned".parse::<TextMismatchPolicy>().unwrap(),
            TextMismatchPolicy::DrawPositioned
        );
    }

    #[test]
    fn names_parse_back() {
        for mode in [RenderMode::Line, RenderMode::Char] {
            assert_eq!(mode.as_str().parse::<RenderMode>().unwrap(), mode);
        }
        for policy in [TextMismatchPolicy::DrawPositioned, TextMismatchPolicy::StripNonCjk] {
            assert_eq!(policy.as_str().parse::<TextMismatchPolicy>().unwrap(), policy);
        }
    }
}
