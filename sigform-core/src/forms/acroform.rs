//! Interactive form (AcroForm) editing on a loaded document

use super::field::{FieldFlags, FieldKind, FieldRect, FormField};
use super::text::{appearance_stream, decode_text_string, helvetica_font};
use crate::error::{Result, SigformError};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Default appearance written to a newly created AcroForm
pub const FORM_DEFAULT_APPEARANCE: &str = "/Helv 0 Tf 0 g";

/// `SignaturesExist` bit of `/SigFlags`
const SIG_FLAGS_SIGNATURES_EXIST: i64 = 1;

/// A form field as found in an existing document
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    /// `None` for field types this crate does not know
    pub kind: Option<FieldKind>,
    pub rect: Option<FieldRect>,
    pub value: Option<String>,
    pub read_only: bool,
    /// 1-based page number of the widget
    pub page: Option<u32>,
}

/// Editor over the document's interactive form.
///
/// Opening the editor guarantees the catalog carries an `/AcroForm` with a
/// `/Fields` array, a default appearance and a Helvetica `/DR` font.
pub struct AcroFormEditor<'a> {
    doc: &'a mut Document,
    acroform: ObjectId,
    font: ObjectId,
}

impl<'a> AcroFormEditor<'a> {
    /// Open the form, creating it when the document has none
    pub fn open(doc: &'a mut Document) -> Result<Self> {
        let catalog = catalog_id(doc)?;
        let created = !doc.get_dictionary(catalog)?.has(b"AcroForm");
        let acroform = hoist_dict(doc, catalog, b"AcroForm")?;
        if created {
            debug!("Document had no AcroForm, created object {:?}", acroform);
        }

        let font = doc.add_object(helvetica_font());

        let form = doc.get_dictionary_mut(acroform)?;
        if !form.has(b"DA") {
            form.set("DA", Object::string_literal(FORM_DEFAULT_APPEARANCE));
        }
        form.set("NeedAppearances", Object::Boolean(true));
        let sig_flags = form
            .get(b"SigFlags")
            .and_then(Object::as_i64)
            .unwrap_or(0);
        form.set(
            "SigFlags",
            Object::Integer(sig_flags | SIG_FLAGS_SIGNATURES_EXIST),
        );

        hoist_array(doc, acroform, b"Fields")?;
        let resources = hoist_dict(doc, acroform, b"DR")?;
        let fonts = hoist_dict(doc, resources, b"Font")?;
        let fonts = doc.get_dictionary_mut(fonts)?;
        if !fonts.has(b"Helv") {
            fonts.set("Helv", Object::Reference(font));
        }

        Ok(Self {
            doc,
            acroform,
            font,
        })
    }

    /// Object id of the AcroForm dictionary
    pub fn id(&self) -> ObjectId {
        self.acroform
    }

    /// Remove every top-level field whose name is in `names`, together with
    /// its widgets on all pages. Returns the number of fields removed.
    pub fn remove_fields(&mut self, names: &[&str]) -> Result<usize> {
        let fields_id = hoist_array(self.doc, self.acroform, b"Fields")?;
        let entries = self.doc.get_object(fields_id)?.as_array()?.clone();

        let mut removed_fields = 0;
        let mut doomed = BTreeSet::new();
        let mut kept = Vec::with_capacity(entries.len());

        for entry in entries {
            let Object::Reference(field_id) = entry else {
                kept.push(entry);
                continue;
            };
            let Ok(field) = self.doc.get_dictionary(field_id) else {
                kept.push(entry);
                continue;
            };
            let matches = field_name(field).is_some_and(|name| names.contains(&name.as_str()));
            if !matches {
                kept.push(entry);
                continue;
            }

            removed_fields += 1;
            doomed.insert(field_id);
            let widgets: Vec<ObjectId> = match field.get(b"Kids").and_then(Object::as_array) {
                Ok(kids) => kids.iter().filter_map(|k| k.as_reference().ok()).collect(),
                Err(_) => vec![field_id],
            };
            for widget in widgets {
                doomed.insert(widget);
                if let Some(ap) = self.appearance_ref(widget) {
                    doomed.insert(ap);
                }
            }
        }

        if removed_fields == 0 {
            return Ok(0);
        }

        *self.doc.get_object_mut(fields_id)?.as_array_mut()? = kept;

        let pages: Vec<ObjectId> = self.doc.get_pages().into_values().collect();
        for page in pages {
            if self.doc.get_dictionary(page)?.has(b"Annots") {
                let annots = hoist_array(self.doc, page, b"Annots")?;
                self.doc
                    .get_object_mut(annots)?
                    .as_array_mut()?
                    .retain(|a| !matches!(a, Object::Reference(id) if doomed.contains(id)));
            }
        }

        for id in &doomed {
            self.doc.objects.remove(id);
        }

        debug!(
            "Removed {} existing field(s) and {} object(s)",
            removed_fields,
            doomed.len()
        );
        Ok(removed_fields)
    }

    /// Add `field` as a merged field/widget on `page`
    pub fn add_field(&mut self, page: ObjectId, field: &FormField) -> Result<ObjectId> {
        let appearance = self.doc.add_object(appearance_stream(field, self.font));
        let field_id = self.doc.add_object(field.to_dict(page, Some(appearance)));

        let annots = hoist_array(self.doc, page, b"Annots")?;
        self.doc
            .get_object_mut(annots)?
            .as_array_mut()?
            .push(Object::Reference(field_id));

        let fields = hoist_array(self.doc, self.acroform, b"Fields")?;
        self.doc
            .get_object_mut(fields)?
            .as_array_mut()?
            .push(Object::Reference(field_id));

        debug!(
            "Added {} field '{}' as object {:?}",
            field.kind.pdf_name(),
            field.name,
            field_id
        );
        Ok(field_id)
    }

    fn appearance_ref(&self, widget: ObjectId) -> Option<ObjectId> {
        self.doc
            .get_dictionary(widget)
            .ok()?
            .get(b"AP")
            .and_then(Object::as_dict)
            .ok()?
            .get(b"N")
            .and_then(Object::as_reference)
            .ok()
    }
}

/// List the top-level fields of the document's interactive form
pub fn read_fields(doc: &Document) -> Result<Vec<FieldInfo>> {
    let catalog = doc.get_dictionary(catalog_id(doc)?)?;
    let Ok(acroform) = catalog.get(b"AcroForm") else {
        return Ok(Vec::new());
    };
    let acroform = resolve(doc, acroform)?.as_dict()?;
    let Ok(fields) = acroform.get(b"Fields") else {
        return Ok(Vec::new());
    };
    let fields = resolve(doc, fields)?.as_array()?;

    let page_numbers: HashMap<ObjectId, u32> = doc
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number))
        .collect();

    let mut infos = Vec::with_capacity(fields.len());
    for entry in fields {
        let field = resolve(doc, entry)?.as_dict()?;

        // Widget data lives on the field itself or on its first kid
        let widget = match field.get(b"Kids").and_then(Object::as_array) {
            Ok(kids) => match kids.first() {
                Some(kid) => resolve(doc, kid)?.as_dict()?,
                None => field,
            },
            Err(_) => field,
        };

        let flags = field
            .get(b"Ff")
            .and_then(Object::as_i64)
            .map(|f| FieldFlags::from_flags(f as u32))
            .unwrap_or_default();

        infos.push(FieldInfo {
            name: field_name(field).unwrap_or_default(),
            kind: field
                .get(b"FT")
                .and_then(Object::as_name)
                .ok()
                .and_then(FieldKind::from_pdf_name),
            rect: widget
                .get(b"Rect")
                .and_then(|r| resolve(doc, r))
                .and_then(Object::as_array)
                .ok()
                .and_then(|r| FieldRect::from_pdf_array(r)),
            value: match field.get(b"V") {
                Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
                Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
                _ => None,
            },
            read_only: flags.read_only,
            page: widget
                .get(b"P")
                .and_then(Object::as_reference)
                .ok()
                .and_then(|p| page_numbers.get(&p).copied()),
        });
    }

    Ok(infos)
}

fn catalog_id(doc: &Document) -> Result<ObjectId> {
    doc.trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| SigformError::InvalidPdf("trailer has no /Root reference".to_string()))
}

fn field_name(field: &Dictionary) -> Option<String> {
    match field.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

fn resolve<'d>(doc: &'d Document, obj: &'d Object) -> lopdf::Result<&'d Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// Make `owner[key]` an indirect dictionary and return its id.
///
/// A direct dictionary is moved into its own object; a missing entry
/// becomes an empty one.
fn hoist_dict(doc: &mut Document, owner: ObjectId, key: &[u8]) -> Result<ObjectId> {
    let entry = doc.get_dictionary(owner)?.get(key).ok().cloned();
    let id = match entry {
        Some(Object::Reference(id)) => {
            doc.get_dictionary(id)?;
            return Ok(id);
        }
        Some(Object::Dictionary(dict)) => doc.add_object(dict),
        _ => doc.add_object(Dictionary::new()),
    };
    doc.get_dictionary_mut(owner)?
        .set(key.to_vec(), Object::Reference(id));
    Ok(id)
}

/// Same as [`hoist_dict`] for arrays
fn hoist_array(doc: &mut Document, owner: ObjectId, key: &[u8]) -> Result<ObjectId> {
    let entry = doc.get_dictionary(owner)?.get(key).ok().cloned();
    let id = match entry {
        Some(Object::Reference(id)) => {
            doc.get_object(id)?.as_array()?;
            return Ok(id);
        }
        Some(Object::Array(items)) => doc.add_object(Object::Array(items)),
        _ => doc.add_object(Object::Array(Vec::new())),
    };
    doc.get_dictionary_mut(owner)?
        .set(key.to_vec(), Object::Reference(id));
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blank::blank_document;
    use crate::forms::field::SignatureBox;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_creates_acroform() {
        let mut doc = blank_document(1);
        let id = AcroFormEditor::open(&mut doc).unwrap().id();

        let form = doc.get_dictionary(id).unwrap();
        assert!(form.get(b"NeedAppearances").unwrap().as_bool().unwrap());
        assert_eq!(form.get(b"SigFlags").unwrap().as_i64().unwrap(), 1);
        assert!(form.has(b"DA"));

        let catalog = doc.get_dictionary(catalog_id(&doc).unwrap()).unwrap();
        assert_eq!(catalog.get(b"AcroForm").unwrap().as_reference().unwrap(), id);
        assert!(read_fields(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_open_hoists_inline_acroform_and_keeps_fields() {
        let mut doc = blank_document(1);
        let existing = doc.add_object(
            FormField::text("other", FieldRect::new(0, 0, 10, 10)).to_dict((1, 0), None),
        );
        let mut inline = Dictionary::new();
        inline.set("Fields", Object::Array(vec![Object::Reference(existing)]));
        inline.set("SigFlags", Object::Integer(2));
        let catalog = catalog_id(&doc).unwrap();
        doc.get_dictionary_mut(catalog)
            .unwrap()
            .set("AcroForm", Object::Dictionary(inline));

        let id = AcroFormEditor::open(&mut doc).unwrap().id();

        let form = doc.get_dictionary(id).unwrap();
        assert_eq!(form.get(b"SigFlags").unwrap().as_i64().unwrap(), 3);
        let fields = read_fields(&doc).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "other");
    }

    #[test]
    fn test_add_field_registers_widget_on_page() {
        let mut doc = blank_document(1);
        let page = *doc.get_pages().get(&1).unwrap();

        let field = FormField::signature("signature", FieldRect::new(400, 50, 100, 50));
        let id = AcroFormEditor::open(&mut doc)
            .unwrap()
            .add_field(page, &field)
            .unwrap();

        let annots = doc.get_dictionary(page).unwrap().get(b"Annots").unwrap();
        let annots = resolve(&doc, annots).unwrap().as_array().unwrap();
        assert!(annots.iter().any(|a| a.as_reference().ok() == Some(id)));

        let fields = read_fields(&doc).unwrap();
        assert_eq!(
            fields,
            vec![FieldInfo {
                name: "signature".to_string(),
                kind: Some(FieldKind::Signature),
                rect: Some(FieldRect::new(400, 50, 100, 50)),
                value: None,
                read_only: false,
                page: Some(1),
            }]
        );
    }

    #[test]
    fn test_remove_fields_only_touches_named_fields() {
        let mut doc = blank_document(1);
        let page = *doc.get_pages().get(&1).unwrap();

        let mut editor = AcroFormEditor::open(&mut doc).unwrap();
        for field in SignatureBox::default().fields("Jane") {
            editor.add_field(page, &field).unwrap();
        }
        editor
            .add_field(page, &FormField::text("notes", FieldRect::new(0, 0, 50, 20)))
            .unwrap();

        let removed = editor
            .remove_fields(&["customerName", "signature"])
            .unwrap();
        assert_eq!(removed, 2);

        let names: Vec<String> = read_fields(&doc)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["manualSignature", "notes"]);

        let annots = doc.get_dictionary(page).unwrap().get(b"Annots").unwrap();
        assert_eq!(resolve(&doc, annots).unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_remove_fields_without_matches_is_noop() {
        let mut doc = blank_document(1);
        let mut editor = AcroFormEditor::open(&mut doc).unwrap();
        assert_eq!(editor.remove_fields(&["signature"]).unwrap(), 0);
    }
}
