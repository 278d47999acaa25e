//! Form field and widget definitions

use super::text::encode_text_string;
use crate::error::{Result, SigformError};
use lopdf::{Dictionary, Object, ObjectId};

/// Name of the read-only customer-name field
pub const CUSTOMER_NAME_FIELD: &str = "customerName";
/// Name of the interactive signature field
pub const SIGNATURE_FIELD: &str = "signature";
/// Name of the free-text manual signature field
pub const MANUAL_SIGNATURE_FIELD: &str = "manualSignature";

/// Fields managed by this crate, in insertion order
pub const MANAGED_FIELDS: [&str; 3] =
    [CUSTOMER_NAME_FIELD, SIGNATURE_FIELD, MANUAL_SIGNATURE_FIELD];

/// Height of the two text fields placed under the signature box
pub const TEXT_FIELD_HEIGHT: i32 = 20;
/// Vertical offset of the customer-name field relative to the signature box
pub const CUSTOMER_NAME_OFFSET: i32 = 30;
/// Vertical offset of the manual-signature field relative to the signature box
pub const MANUAL_SIGNATURE_OFFSET: i32 = 60;

/// Default appearance used by text fields
pub const DEFAULT_APPEARANCE: &str = "/Helv 10 Tf 0 g";

/// Type of form field according to ISO 32000-1 Section 12.7.4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Button field (push button, checkbox, radio button)
    Button,
    /// Text field
    Text,
    /// Choice field (list box, combo box)
    Choice,
    /// Signature field
    Signature,
}

impl FieldKind {
    /// Get the PDF field type name
    pub fn pdf_name(&self) -> &'static str {
        match self {
            FieldKind::Button => "Btn",
            FieldKind::Text => "Tx",
            FieldKind::Choice => "Ch",
            FieldKind::Signature => "Sig",
        }
    }

    /// Parse a `/FT` name
    pub fn from_pdf_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Btn" => Some(FieldKind::Button),
            b"Tx" => Some(FieldKind::Text),
            b"Ch" => Some(FieldKind::Choice),
            b"Sig" => Some(FieldKind::Signature),
            _ => None,
        }
    }
}

/// Field flags according to ISO 32000-1 Table 221
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
    /// Field is read-only
    pub read_only: bool,
    /// Field is required
    pub required: bool,
    /// Field should not be exported
    pub no_export: bool,
}

impl FieldFlags {
    /// Convert to PDF flags integer
    pub fn to_flags(&self) -> u32 {
        let mut flags = 0u32;
        if self.read_only {
            flags |= 1 << 0;
        }
        if self.required {
            flags |= 1 << 1;
        }
        if self.no_export {
            flags |= 1 << 2;
        }
        flags
    }

    /// Read flags back from a PDF `/Ff` integer
    pub fn from_flags(flags: u32) -> Self {
        Self {
            read_only: flags & (1 << 0) != 0,
            required: flags & (1 << 1) != 0,
            no_export: flags & (1 << 2) != 0,
        }
    }
}

/// Axis-aligned field rectangle in PDF user space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FieldRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `[llx lly urx ury]` as stored in `/Rect`
    pub fn to_pdf_array(&self) -> Vec<Object> {
        vec![
            Object::Integer(self.x as i64),
            Object::Integer(self.y as i64),
            Object::Integer(self.x as i64 + self.width as i64),
            Object::Integer(self.y as i64 + self.height as i64),
        ]
    }

    /// Rebuild from a `/Rect` array, normalising corner order
    pub fn from_pdf_array(values: &[Object]) -> Option<Self> {
        if values.len() != 4 {
            return None;
        }
        let mut coords = [0f32; 4];
        for (slot, value) in coords.iter_mut().zip(values) {
            *slot = number(value)?;
        }
        let (llx, urx) = (coords[0].min(coords[2]), coords[0].max(coords[2]));
        let (lly, ury) = (coords[1].min(coords[3]), coords[1].max(coords[3]));
        Some(Self::new(
            llx.round() as i32,
            lly.round() as i32,
            (urx - llx).round() as i32,
            (ury - lly).round() as i32,
        ))
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Caller-supplied signature box; all three fields are placed relative to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for SignatureBox {
    fn default() -> Self {
        Self {
            x: 400,
            y: 50,
            width: 100,
            height: 50,
        }
    }
}

impl SignatureBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width and height must be strictly positive and the text fields below
    /// the box must stay within `i32`
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 {
            return Err(SigformError::InvalidGeometry(format!(
                "width must be positive, got {}",
                self.width
            )));
        }
        if self.height <= 0 {
            return Err(SigformError::InvalidGeometry(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        if self.y.checked_sub(MANUAL_SIGNATURE_OFFSET).is_none() {
            return Err(SigformError::InvalidGeometry(format!(
                "y is too small to place the fields below it, got {}",
                self.y
            )));
        }
        Ok(())
    }

    /// The three fields for this box: customer name, signature, manual signature
    pub fn fields(&self, customer_name: &str) -> [FormField; 3] {
        [
            FormField::text(
                CUSTOMER_NAME_FIELD,
                FieldRect::new(
                    self.x,
                    self.y - CUSTOMER_NAME_OFFSET,
                    self.width,
                    TEXT_FIELD_HEIGHT,
                ),
            )
            .with_value(customer_name)
            .read_only()
            .with_tooltip("Customer name"),
            FormField::signature(
                SIGNATURE_FIELD,
                FieldRect::new(self.x, self.y, self.width, self.height),
            )
            .with_tooltip("Signature"),
            FormField::text(
                MANUAL_SIGNATURE_FIELD,
                FieldRect::new(
                    self.x,
                    self.y - MANUAL_SIGNATURE_OFFSET,
                    self.width,
                    TEXT_FIELD_HEIGHT,
                ),
            )
            .with_value("")
            .with_tooltip("Manual signature"),
        ]
    }
}

/// A terminal form field with a single merged widget annotation
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub kind: FieldKind,
    /// Partial field name (`/T`)
    pub name: String,
    pub rect: FieldRect,
    /// Current value (`/V`)
    pub value: Option<String>,
    pub flags: FieldFlags,
    /// Alternate description shown by viewers (`/TU`)
    pub tooltip: Option<String>,
}

impl FormField {
    /// Create a text field
    pub fn text(name: impl Into<String>, rect: FieldRect) -> Self {
        Self::new(FieldKind::Text, name, rect)
    }

    /// Create a signature field
    pub fn signature(name: impl Into<String>, rect: FieldRect) -> Self {
        Self::new(FieldKind::Signature, name, rect)
    }

    fn new(kind: FieldKind, name: impl Into<String>, rect: FieldRect) -> Self {
        Self {
            kind,
            name: name.into(),
            rect,
            value: None,
            flags: FieldFlags::default(),
            tooltip: None,
        }
    }

    /// Set the current value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Mark the field read-only
    pub fn read_only(mut self) -> Self {
        self.flags.read_only = true;
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Merged field/widget dictionary placed on `page`.
    ///
    /// `appearance` is the normal appearance stream, if one was generated.
    pub fn to_dict(&self, page: ObjectId, appearance: Option<ObjectId>) -> Dictionary {
        let mut dict = Dictionary::new();

        // Widget annotation part
        dict.set("Type", Object::Name(b"Annot".to_vec()));
        dict.set("Subtype", Object::Name(b"Widget".to_vec()));
        dict.set("Rect", Object::Array(self.rect.to_pdf_array()));
        dict.set("P", Object::Reference(page));
        // Print flag
        dict.set("F", Object::Integer(4));

        let mut bs = Dictionary::new();
        bs.set("W", Object::Integer(1));
        bs.set("S", Object::Name(b"S".to_vec()));
        dict.set("BS", Object::Dictionary(bs));

        let mut mk = Dictionary::new();
        mk.set(
            "BC",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(0),
            ]),
        );
        dict.set("MK", Object::Dictionary(mk));

        if let Some(ap) = appearance {
            let mut ap_dict = Dictionary::new();
            ap_dict.set("N", Object::Reference(ap));
            dict.set("AP", Object::Dictionary(ap_dict));
        }

        // Field part
        dict.set("FT", Object::Name(self.kind.pdf_name().as_bytes().to_vec()));
        dict.set("T", encode_text_string(&self.name));

        if let Some(ref tooltip) = self.tooltip {
            dict.set("TU", encode_text_string(tooltip));
        }

        if let Some(ref value) = self.value {
            dict.set("V", encode_text_string(value));
        }

        let flags = self.flags.to_flags();
        if flags != 0 {
            dict.set("Ff", Object::Integer(flags as i64));
        }

        if self.kind == FieldKind::Text {
            dict.set("DA", Object::string_literal(DEFAULT_APPEARANCE));
        }

        dict
    }
}
