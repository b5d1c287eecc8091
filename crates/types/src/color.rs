use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An RGB colour. Anything malformed decodes to black.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"r g b"`; fewer than three components or a bad component gives black.
    pub fn parse_lenient(s: &str) -> Self {
        let parts: Vec<&str> = s.split_whitespace().collect();
        Self::from_components(parts.iter().map(|p| p.parse::<f64>().ok()))
    }

    fn from_components<I>(components: I) -> Self
    where
        I: Iterator<Item = Option<f64>>,
    {
        let values: Vec<Option<f64>> = components.take(3).collect();
        match values.as_slice() {
            [Some(r), Some(g), Some(b)] => Self {
                r: channel(*r),
                g: channel(*g),
                b: channel(*b),
            },
            _ => Self::BLACK,
        }
    }

    /// Components as PDF operands in `0.0..=1.0`.
    pub fn to_unit(self) -> [f32; 3] {
        [self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0]
    }
}

fn channel(v: f64) -> u8 {
    if v.is_finite() { v.clamp(0.0, 255.0).round() as u8 } else { 0 }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Color::parse_lenient(&s),
            Value::Array(items) => Color::from_components(items.iter().map(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })),
            _ => Color::BLACK,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_space_separated_components() {
        assert_eq!(Color::parse_lenient("255 0 128"), Color::rgb(255, 0, 128));
    }

    #[test]
    fn malformed_colors_fall_back_to_black() {
        assert_eq!(Color::parse_lenient("255 0"), Color::BLACK);
        assert_eq!(Color::parse_lenient("red green blue"), Color::BLACK);
        let c: Color = serde_json::from_str("[12]").unwrap();
        assert_eq!(c, Color::BLACK);
        let c: Color = serde_json::from_str("null").unwrap();
        assert_eq!(c, Color::BLACK);
    }

    #[test]
    fn array_components_are_clamped() {
        let c: Color = serde_json::from_str("[300, \"20\", -4]").unwrap();
        assert_eq!(c, Color::rgb(255, 20, 0));
    }
}
