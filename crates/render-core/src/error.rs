use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// A delta rule, path op-code stream, or numeric field could not be parsed.
    #[error("decode error: {0}")]
    Decode(String),
    #[error("resource missing: {0}")]
    ResourceMissing(String),
    #[error("coordinate out of bounds: {0}")]
    BoundsViolation(String),
    #[error("chunk {index} failed to render: {message}")]
    ChunkRenderFailure { index: usize, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}
