//! Seal extraction collaborator.
//!
//! A signature record carries an opaque signed value (typically a CMS/SES
//! structure). Pulling the stamp picture out of it is somebody else's job;
//! the renderer only consumes the decoded rasters.

use image::DynamicImage;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SealError {
    #[error("signed value could not be parsed: {0}")]
    Malformed(String),
    #[error("seal image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
}

/// Turns an opaque signed-value blob into zero or more seal images.
///
/// Shared across worker threads, so implementations must be thread safe.
pub trait SealExtractor: Send + Sync + Debug {
    fn extract(&self, signed_value: &[u8]) -> Result<Vec<DynamicImage>, SealError>;
}

/// Extractor for deployments without seal support: never yields an image.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSealExtractor;

impl SealExtractor for NoSealExtractor {
    fn extract(&self, _signed_value: &[u8]) -> Result<Vec<DynamicImage>, SealError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_seal_extractor_yields_nothing() {
        let images = NoSealExtractor.extract(b"anything").unwrap();
        assert!(images.is_empty());
    }
}
