//! Page partitioning for the concurrent path.

use ofdrender_types::Document;

/// One page of the job, addressed by document unit and page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlot {
    pub doc: usize,
    pub page: usize,
}

/// A contiguous, index-ordered run of pages rendered as one sub-document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub slots: Vec<PageSlot>,
}

impl Chunk {
    /// A page break follows every page of the chunk but its last.
    pub fn breaks_after(&self, position: usize) -> bool {
        position + 1 < self.slots.len()
    }
}

/// All pages of the job in output order.
pub fn page_slots(documents: &[Document]) -> Vec<PageSlot> {
    documents
        .iter()
        .enumerate()
        .flat_map(|(doc, d)| (0..d.pages.len()).map(move |page| PageSlot { doc, page }))
        .collect()
}

/// Splits `slots` into chunks of `size` pages; the last may be shorter.
pub fn plan_chunks(slots: &[PageSlot], size: usize) -> Vec<Chunk> {
    slots
        .chunks(size.max(1))
        .enumerate()
        .map(|(index, slots)| Chunk { index, slots: slots.to_vec() })
        .collect()
}
