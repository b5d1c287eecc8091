//! Ordered page merge for finished sub-documents.
//!
//! Every chunk of a render job produces a complete PDF of its own. This
//! crate appends their pages, in the order given, to one target document by
//! deep-copying each page and everything it references.

mod error;

pub use error::ComposerError;

use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// A helper struct to manage the state of copying objects between documents.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document, target_doc: &'a mut Document) -> Self {
        Self { source_doc, target_doc, id_map: HashMap::new() }
    }

    /// Deep copies an object, copying each referenced object only once.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the id before recursing so reference cycles terminate.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;
        match self.target_doc.objects.get_mut(&new_id) {
            Some(target_obj) => *target_obj = new_obj,
            None => return Err(lopdf::Error::ObjectNotFound(new_id)),
        }
        Ok(new_id)
    }

    /// Copies a page without its `/Parent` link, resolving inherited
    /// attributes onto the page itself.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let mut page = self.source_doc.get_dictionary(page_id)?.clone();
        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = self.inherited(&page, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
        page.remove(b"Parent");

        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(page_id, new_id);
        let new_page = self.remap_references(Object::Dictionary(page))?;
        match self.target_doc.objects.get_mut(&new_id) {
            Some(target_obj) => *target_obj = new_page,
            None => return Err(lopdf::Error::ObjectNotFound(new_id)),
        }
        Ok(new_id)
    }

    fn inherited(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        // Page trees are shallow; the bound only guards against cycles.
        for _ in 0..32 {
            let node = self.source_doc.get_dictionary(parent?).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    /// Replaces every reference inside `obj` with its copy in the target.
    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => {
                let new_id = self.copy_object(id)?;
                Ok(Object::Reference(new_id))
            }
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }
}

/// Appends all pages of `source` to `target`, keeping their order. Returns
/// the number of pages appended.
pub fn merge_documents(target: &mut Document, source: Document) -> Result<usize, ComposerError> {
    let source_pages = source.get_pages();
    if source_pages.is_empty() {
        return Ok(0);
    }

    let mut copier = ObjectCopier::new(&source, target);
    let mut new_page_ids = Vec::with_capacity(source_pages.len());
    // `get_pages` is keyed by page number, so this walks in page order.
    for page_id in source_pages.values() {
        new_page_ids.push(copier.copy_page(*page_id)?);
    }

    let pages_id = target.catalog()?.get(b"Pages")?.as_reference()?;
    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;
    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let original_count = pages_dict.get(b"Count")?.as_i64()?;
    kids.extend(new_page_ids.iter().map(|id| Object::Reference(*id)));
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", original_count + new_page_ids.len() as i64);

    for page_id in &new_page_ids {
        if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(*page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }
    debug!("[MERGE] Appended {} pages", new_page_ids.len());
    Ok(new_page_ids.len())
}

/// Merges documents in iteration order into the first one.
pub fn merge_all<I>(documents: I) -> Result<Document, ComposerError>
where
    I: IntoIterator<Item = Document>,
{
    let mut documents = documents.into_iter();
    let mut target = documents
        .next()
        .ok_or_else(|| ComposerError::Other("no documents to merge".to_string()))?;
    for source in documents {
        merge_documents(&mut target, source)?;
    }
    Ok(target)
}
