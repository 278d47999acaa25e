//! PDF text strings and widget appearance streams

use super::field::{FieldKind, FormField};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat};

/// Font size used inside text field appearances
const APPEARANCE_FONT_SIZE: i32 = 10;

/// Encode `text` as a PDF text string (ISO 32000-1 7.9.2.2).
///
/// Plain ASCII stays a literal string; anything else becomes UTF-16BE with a
/// byte order mark.
pub fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Decode a PDF text string produced by any writer
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    // PDFDocEncoding agrees with Latin-1 for everything we write
    bytes.iter().map(|&b| b as char).collect()
}

/// Escape `text` for a literal string inside a content stream.
///
/// The standard Helvetica font is WinAnsi encoded; characters outside
/// Latin-1 are replaced with `?`. Viewers regenerate the appearance from
/// `/V` because the form sets `/NeedAppearances`.
fn content_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for ch in text.chars() {
        let code = ch as u32;
        let byte = match code {
            0x20..=0x7E | 0xA0..=0xFF => code as u8,
            _ => b'?',
        };
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
    out
}

/// Normal appearance stream (Form XObject) for a widget.
///
/// Every widget gets a one-point border; text fields additionally show
/// their value in `/Helv`.
pub fn appearance_stream(field: &FormField, font: ObjectId) -> Stream {
    let width = field.rect.width;
    let height = field.rect.height;

    let mut content = Vec::new();
    content.extend_from_slice(
        format!(
            "q\n0 G\n1 w\n0.5 0.5 {} {} re\nS\nQ\n",
            width as f32 - 1.0,
            height as f32 - 1.0
        )
        .as_bytes(),
    );

    if field.kind == FieldKind::Text {
        content.extend_from_slice(b"/Tx BMC\n");
        if let Some(value) = field.value.as_deref().filter(|v| !v.is_empty()) {
            let baseline = ((height - APPEARANCE_FONT_SIZE) / 2 + 2).max(1);
            content.extend_from_slice(
                format!(
                    "q\nBT\n/Helv {APPEARANCE_FONT_SIZE} Tf\n0 g\n2 {baseline} Td\n"
                )
                .as_bytes(),
            );
            content.extend_from_slice(&content_literal(value));
            content.extend_from_slice(b" Tj\nET\nQ\n");
        }
        content.extend_from_slice(b"EMC\n");
    }

    let mut fonts = Dictionary::new();
    fonts.set("Helv", Object::Reference(font));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Form".to_vec()));
    dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width as i64),
            Object::Integer(height as i64),
        ]),
    );
    dict.set("Resources", Object::Dictionary(resources));

    Stream::new(dict, content)
}

/// Standard 14 Helvetica font dictionary used by `/DR` and appearances
pub fn helvetica_font() -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font
}
