//! Signature form fields according to ISO 32000-1 Chapter 12.7
//!
//! This module builds the three fields placed around a signature box and
//! edits the interactive form of an existing document to hold them.

mod acroform;
mod field;
mod text;

pub use acroform::{read_fields, AcroFormEditor, FieldInfo, FORM_DEFAULT_APPEARANCE};
pub use field::{
    FieldFlags, FieldKind, FieldRect, FormField, SignatureBox, CUSTOMER_NAME_FIELD,
    CUSTOMER_NAME_OFFSET, DEFAULT_APPEARANCE, MANAGED_FIELDS, MANUAL_SIGNATURE_FIELD,
    MANUAL_SIGNATURE_OFFSET, SIGNATURE_FIELD, TEXT_FIELD_HEIGHT,
};
pub use text::{decode_text_string, encode_text_string};
