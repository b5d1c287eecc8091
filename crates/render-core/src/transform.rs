//! Glyph coordinate expansion.
//!
//! OFD stores the first glyph's offset plus a delta rule for the rest, e.g.
//! `"g 3 1.5 2.0"` meaning three steps of 1.5 followed by one step of 2.0.

use crate::error::RenderError;
use ofdrender_types::{Axis, Ctm};

/// Upper bound on expanded deltas; guards against `g 4000000000 1` style input.
const MAX_EXPANDED_DELTAS: usize = 1 << 20;

fn parse_number(token: &str, what: &str) -> Result<f32, RenderError> {
    match token.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RenderError::Decode(format!("invalid {} '{}'", what, token))),
    }
}

/// Expands a delta rule into individual increments.
pub fn expand_delta(rule: &str) -> Result<Vec<f32>, RenderError> {
    let tokens: Vec<&str> = rule.split_whitespace().collect();
    let mut deltas = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "g" && i + 2 < tokens.len() {
            let count = tokens[i + 1]
                .parse::<usize>()
                .map_err(|_| RenderError::Decode(format!("invalid repeat count '{}'", tokens[i + 1])))?;
            if deltas.len().saturating_add(count) > MAX_EXPANDED_DELTAS {
                return Err(RenderError::Decode(format!("repeat count {} too large", count)));
            }
            let value = parse_number(tokens[i + 2], "delta")?;
            deltas.extend(std::iter::repeat_n(value, count));
            i += 3;
        } else {
            deltas.push(parse_number(tokens[i], "delta")?);
            i += 1;
        }
        if deltas.len() > MAX_EXPANDED_DELTAS {
            return Err(RenderError::Decode("delta rule too long".to_string()));
        }
    }
    Ok(deltas)
}

/// Parses an offset attribute; blank means zero.
pub fn parse_offset(offset: &str) -> Result<f32, RenderError> {
    let trimmed = offset.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    parse_number(trimmed, "offset")
}

/// Absolute coordinates of every glyph of a run along one axis, in millimetres.
///
/// The result always holds exactly `glyph_count` values. Missing deltas repeat
/// the last one given, surplus deltas are ignored.
pub fn axis_positions(
    origin: f32,
    offset: &str,
    delta_rule: &str,
    glyph_count: usize,
    ctm: Option<&Ctm>,
    axis: Axis,
) -> Result<Vec<f32>, RenderError> {
    if glyph_count == 0 {
        return Ok(Vec::new());
    }
    let (scale, shift) = ctm.map_or((1.0, 0.0), |m| (m.scale(axis), m.translation(axis)));
    let start = origin + (parse_offset(offset)? + shift) * scale;
    let deltas = expand_delta(delta_rule)?;
    let pad = deltas.last().copied().unwrap_or(0.0);

    let mut positions = Vec::with_capacity(glyph_count);
    let mut current = start;
    positions.push(current);
    for i in 0..glyph_count - 1 {
        current += deltas.get(i).copied().unwrap_or(pad) * scale;
        positions.push(current);
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_repeat_groups() {
        assert_eq!(expand_delta("g 3 1.5 2.0").unwrap(), vec![1.5, 1.5, 1.5, 2.0]);
        assert_eq!(expand_delta("1 g 2 0.5 3").unwrap(), vec![1.0, 0.5, 0.5, 3.0]);
    }

    #[test]
    fn blank_rule_is_empty() {
        assert!(expand_delta("").unwrap().is_empty());
        assert!(expand_delta("   ").unwrap().is_empty());
    }

    #[test]
    fn trailing_g_without_operands_is_a_decode_error() {
        assert!(matches!(expand_delta("1 g 2"), Err(RenderError::Decode(_))));
        assert!(matches!(expand_delta("1 x"), Err(RenderError::Decode(_))));
        assert!(matches!(expand_delta("g -1 2 3"), Err(RenderError::Decode(_))));
        assert!(matches!(expand_delta("NaN"), Err(RenderError::Decode(_))));
    }

    #[test]
    fn absurd_repeat_counts_are_rejected() {
        assert!(matches!(expand_delta("g 4000000000 1 0"), Err(RenderError::Decode(_))));
    }

    #[test]
    fn positions_have_exactly_glyph_count_entries() {
        for count in 1..8 {
            let short = axis_positions(10.0, "0", "5", count, None, Axis::X).unwrap();
            let long = axis_positions(10.0, "0", "g 20 1", count, None, Axis::X).unwrap();
            let none = axis_positions(10.0, "", "", count, None, Axis::X).unwrap();
            assert_eq!(short.len(), count);
            assert_eq!(long.len(), count);
            assert_eq!(none.len(), count);
        }
        assert!(axis_positions(10.0, "0", "1", 0, None, Axis::X).unwrap().is_empty());
    }

    #[test]
    fn missing_deltas_repeat_the_last_one() {
        let xs = axis_positions(0.0, "0", "2 3", 5, None, Axis::X).unwrap();
        assert_eq!(xs, vec![0.0, 2.0, 5.0, 8.0, 11.0]);
    }

    #[test]
    fn ctm_scales_and_translates() {
        let ctm = Ctm::from_slice(&[1.0, 0.0, 0.0, 2.0, 0.0, 1.0]).unwrap();
        let ys = axis_positions(10.0, "3", "1", 3, Some(&ctm), Axis::Y).unwrap();
        // start = 10 + (3 + 1) * 2, then steps of 1 * 2
        assert_eq!(ys, vec![18.0, 20.0, 22.0]);
    }

    #[test]
    fn scenario_a_coordinates() {
        let xs = axis_positions(10.0, "0", "g 1 5", 2, None, Axis::X).unwrap();
        assert_eq!(xs, vec![10.0, 15.0]);
    }

    #[test]
    fn bad_offset_is_a_decode_error() {
        assert!(matches!(
            axis_positions(0.0, "abc", "", 2, None, Axis::X),
            Err(RenderError::Decode(_))
        ));
    }
}
