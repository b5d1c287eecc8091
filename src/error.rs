use ofdrender_pdf_composer::ComposerError;
use ofdrender_render_core::RenderError;
use thiserror::Error;

/// Everything that can end a render job.
#[derive(Error, Debug)]
pub enum OfdRenderError {
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Merging chunks failed: {0}")]
    Compose(#[from] ComposerError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The job contains no pages")]
    NoPages,
}
