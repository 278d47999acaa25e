//! Signature field injection into an existing PDF

use crate::error::{Result, SigformError};
use crate::forms::{AcroFormEditor, SignatureBox, MANAGED_FIELDS};
use lopdf::Document;
use tracing::{debug, info};

/// Add the customer-name, signature and manual-signature fields to the last
/// page of `pdf` and return the serialized document.
///
/// Fields left by an earlier call with the same names are replaced, so
/// annotating twice still yields exactly three managed fields.
pub fn annotate_document(
    pdf: &[u8],
    customer_name: &str,
    signature_box: SignatureBox,
) -> Result<Vec<u8>> {
    signature_box.validate()?;

    let mut doc = Document::load_mem(pdf)?;
    if doc.trailer.has(b"Encrypt") {
        return Err(SigformError::InvalidPdf(
            "encrypted documents are not supported".to_string(),
        ));
    }

    let pages = doc.get_pages();
    let (&page_number, &page) = pages
        .iter()
        .next_back()
        .ok_or_else(|| SigformError::InvalidPdf("document has no pages".to_string()))?;

    let mut form = AcroFormEditor::open(&mut doc)?;
    let replaced = form.remove_fields(&MANAGED_FIELDS)?;
    if replaced > 0 {
        debug!("Replacing {} previously added field(s)", replaced);
    }

    for field in signature_box.fields(customer_name) {
        form.add_field(page, &field)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)?;

    info!(
        "Added signature fields on page {} at ({}, {}) size {}x{}",
        page_number, signature_box.x, signature_box.y, signature_box.width, signature_box.height
    );
    Ok(output)
}
