pub mod fixtures;
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use ofdrender::{Document, OfdRenderer, RenderConfig, RenderOutput};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    /// Create a GeneratedPdf from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    /// Get the number of pages in the PDF
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Renders `documents` with `config`, failing on any error.
pub fn render_with(
    config: RenderConfig,
    documents: Vec<Document>,
) -> Result<(RenderOutput, GeneratedPdf), Box<dyn std::error::Error>> {
    let output = OfdRenderer::new(config).try_render(documents)?;
    let pdf = GeneratedPdf::from_bytes(output.bytes.clone())?;
    Ok((output, pdf))
}
