//! Blank documents used by the toolkit self-check

use crate::error::Result;
use lopdf::{Dictionary, Document, Object, Stream};

/// A4 media box in points
pub const A4: [i64; 4] = [0, 0, 595, 842];

/// Document with `page_count` empty A4 pages
pub fn blank_document(page_count: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(page_count as usize);
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_count as i64));
    pages.set("Kids", Object::Array(kids));
    pages.set(
        "MediaBox",
        Object::Array(A4.iter().map(|&v| Object::Integer(v)).collect()),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

/// Serialize a document into memory
pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_document_page_count() {
        let mut doc = blank_document(4);
        let bytes = to_bytes(&mut doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 4);
    }

    #[test]
    fn test_zero_pages_is_still_a_document() {
        let mut doc = blank_document(0);
        let bytes = to_bytes(&mut doc).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert!(reloaded.get_pages().is_empty());
    }
}
