//! In-process PDF operations built on `lopdf`: merge, split, and the
//! strip-and-resave compress fallback.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId, dictionary};

use crate::error::ConversionError;

/// Number of pages in a PDF.
pub fn page_count(data: &[u8]) -> Result<usize, ConversionError> {
    Ok(Document::load_mem(data)?.get_pages().len())
}

/// Concatenate the pages of every input, in input order, into one PDF.
pub fn merge(inputs: &[Vec<u8>]) -> Result<Vec<u8>, ConversionError> {
    let mut max_id = 1u32;
    // Page objects in strict input order; object identity for everything else.
    let mut page_objects: Vec<(ObjectId, Object)> = Vec::new();
    let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for data in inputs {
        let mut doc = Document::load_mem(data)?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, object_id) in doc.get_pages() {
            let object = doc.get_object(object_id)?.to_owned();
            page_objects.push((object_id, object));
        }
        all_objects.append(&mut doc.objects);
    }

    if page_objects.is_empty() {
        return Err(ConversionError::InvalidInput(
            "None of the uploaded PDFs contain pages".to_string(),
        ));
    }

    let mut merged = Document::with_version("1.5");
    // The first document's page-tree root keeps its inheritable attributes
    // (MediaBox, Resources); pages, catalogs, and outlines are rebuilt.
    let mut pages_dict: Option<lopdf::Dictionary> = None;

    for (object_id, object) in all_objects {
        let type_name = object
            .as_dict()
            .ok()
            .and_then(|d| d.get(b"Type").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| n.to_vec());

        match type_name.as_deref() {
            Some(b"Catalog") | Some(b"Outlines") | Some(b"Outline") | Some(b"Page") => {}
            Some(b"Pages") => {
                if pages_dict.is_none() {
                    pages_dict = object.as_dict().ok().cloned();
                }
            }
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let mut pages_dict = pages_dict.ok_or_else(|| {
        ConversionError::InvalidInput("Uploaded PDF has no page tree".to_string())
    })?;

    merged.max_id = max_id;
    let pages_id = merged.new_object_id();

    for (page_id, page_object) in &page_objects {
        let mut dict = page_object.as_dict()?.clone();
        dict.set("Parent", Object::Reference(pages_id));
        merged
            .objects
            .insert(*page_id, Object::Dictionary(dict));
    }

    pages_dict.remove(b"Parent");
    pages_dict.set("Type", "Pages");
    pages_dict.set("Count", page_objects.len() as i64);
    pages_dict.set(
        "Kids",
        page_objects
            .iter()
            .map(|(id, _)| Object::Reference(*id))
            .collect::<Vec<_>>(),
    );
    merged
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    merged.trailer.set("Root", catalog_id);

    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();
    save_to_vec(&mut merged)
}

/// Split a PDF into one single-page PDF per page, in page order.
pub fn split(data: &[u8]) -> Result<Vec<Vec<u8>>, ConversionError> {
    let source = Document::load_mem(data)?;
    let total = source.get_pages().len() as u32;
    if total == 0 {
        return Err(ConversionError::InvalidInput(
            "Uploaded PDF has no pages".to_string(),
        ));
    }

    let mut outputs = Vec::with_capacity(total as usize);
    for page in 1..=total {
        let mut doc = source.clone();
        let delete: Vec<u32> = (1..=total).filter(|n| *n != page).collect();
        if !delete.is_empty() {
            doc.delete_pages(&delete);
        }
        doc.prune_objects();
        doc.renumber_objects();
        doc.compress();
        outputs.push(save_to_vec(&mut doc)?);
    }

    Ok(outputs)
}

/// Re-save a PDF with document metadata stripped and streams compressed.
///
/// The in-process fallback when Ghostscript is unavailable: output is
/// structurally valid and no larger than a plain re-save, though far less
/// aggressive than a real recompression.
pub fn strip_and_resave(data: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let mut doc = Document::load_mem(data)?;

    doc.trailer.remove(b"Info");
    if let Ok(catalog_id) = doc.trailer.get(b"Root").and_then(|o| o.as_reference()) {
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.remove(b"Metadata");
        }
    }

    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();
    save_to_vec(&mut doc)
}

fn save_to_vec(doc: &mut Document) -> Result<Vec<u8>, ConversionError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// Build a minimal valid PDF with the given number of pages.
    pub fn sample_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut kids = Vec::new();
        for n in 0..pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("Page {}", n + 1))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
            });
            kids.push(Object::Reference(page_id));
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}
