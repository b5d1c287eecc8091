use crate::error::ModelError;
use serde::{Deserialize, Deserializer, de};
use std::fmt;

/// An axis of the page coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// An axis-aligned box `[x, y, width, height]` in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Boundary {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Boundary {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Parses the OFD text form, e.g. `"0 0 210 297"`.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let values = parse_numbers(s).ok_or_else(|| ModelError::InvalidBoundary(s.to_string()))?;
        Self::from_slice(&values).map_err(|_| ModelError::InvalidBoundary(s.to_string()))
    }

    pub fn from_slice(values: &[f32]) -> Result<Self, ModelError> {
        match values {
            [x, y, w, h] if values.iter().all(|v| v.is_finite()) => Ok(Self::new(*x, *y, *w, *h)),
            _ => Err(ModelError::InvalidBoundary(format!("{:?}", values))),
        }
    }

    /// A box with no area is treated as "not specified" by the page-size table.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Tolerant equality used when comparing declared boxes against page sizes.
    pub fn approx_eq(&self, other: &Boundary) -> bool {
        const EPSILON: f32 = 0.01;
        (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.width - other.width).abs() < EPSILON
            && (self.height - other.height).abs() < EPSILON
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// A 2D affine transform `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ctm {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Ctm {
    pub const IDENTITY: Ctm = Ctm { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let values = parse_numbers(s).ok_or_else(|| ModelError::InvalidCtm(s.to_string()))?;
        Self::from_slice(&values).map_err(|_| ModelError::InvalidCtm(s.to_string()))
    }

    pub fn from_slice(values: &[f32]) -> Result<Self, ModelError> {
        match values {
            [a, b, c, d, e, f] if values.iter().all(|v| v.is_finite()) => Ok(Self {
                a: *a,
                b: *b,
                c: *c,
                d: *d,
                e: *e,
                f: *f,
            }),
            _ => Err(ModelError::InvalidCtm(format!("{:?}", values))),
        }
    }

    /// Scale component for an axis (`a` for X, `d` for Y).
    pub fn scale(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.a,
            Axis::Y => self.d,
        }
    }

    /// Translation component for an axis (`e` for X, `f` for Y).
    pub fn translation(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.e,
            Axis::Y => self.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }
}

fn parse_numbers(s: &str) -> Option<Vec<f32>> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f32>().ok())
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumbersDef {
    Str(String),
    Nums(Vec<f32>),
}

impl<'de> Deserialize<'de> for Boundary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumbersDef::deserialize(deserializer)? {
            NumbersDef::Str(s) => Boundary::parse(&s).map_err(de::Error::custom),
            NumbersDef::Nums(v) => Boundary::from_slice(&v).map_err(de::Error::custom),
        }
    }
}

impl<'de> Deserialize<'de> for Ctm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumbersDef::deserialize(deserializer)? {
            NumbersDef::Str(s) => Ctm::parse(&s).map_err(de::Error::custom),
            NumbersDef::Nums(v) => Ctm::from_slice(&v).map_err(de::Error::custom),
        }
    }
}
