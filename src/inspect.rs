// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Structural checks on exported PDFs.
//!
//! Used by the `inspect` subcommand and by tests to confirm that a rendered certificate has the
//! expected page count and paper size without comparing bytes.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Context as _, Error, ErrorKind};

/// Width and height of one page's media box, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
}

/// What [`summarize`] found in a PDF.
#[derive(Clone, Debug, PartialEq)]
pub struct PdfSummary {
    pub version: String,
    pub pages: Vec<PageBox>,
    pub producer: Option<String>,
}

impl PdfSummary {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Parses `bytes` as a PDF and collects its version, page boxes and producer.
pub fn summarize(bytes: &[u8]) -> Result<PdfSummary, Error> {
    let document = Document::load_mem(bytes)
        .map_err(|e| Error::new(format!("Failed to parse PDF: {}", e), e))?;
    let pages = document
        .get_pages()
        .values()
        .map(|id| media_box(&document, *id))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PdfSummary {
        version: document.version.clone(),
        pages,
        producer: producer(&document),
    })
}

/// Media boxes of every page, in page order.
pub fn page_boxes(bytes: &[u8]) -> Result<Vec<PageBox>, Error> {
    summarize(bytes).map(|s| s.pages)
}

pub fn page_count(bytes: &[u8]) -> Result<usize, Error> {
    summarize(bytes).map(|s| s.page_count())
}

// MediaBox is inheritable, so walk up the page tree until one is found.
fn media_box(document: &Document, page: ObjectId) -> Result<PageBox, Error> {
    let mut current = Some(page);
    while let Some(id) = current {
        let dict = document
            .get_dictionary(id)
            .context("Page tree node is not a dictionary")?;
        if let Ok(Object::Array(values)) = dict.get(b"MediaBox") {
            return box_from_array(values);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Err(Error::new(
        format!("Page {:?} has no MediaBox", page),
        ErrorKind::InvalidData,
    ))
}

fn box_from_array(values: &[Object]) -> Result<PageBox, Error> {
    let numbers = values
        .iter()
        .map(|v| match v {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            Error::new("MediaBox holds a non-numeric value", ErrorKind::InvalidData)
        })?;
    match numbers.as_slice() {
        [x0, y0, x1, y1] => Ok(PageBox {
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }),
        _ => Err(Error::new(
            format!("MediaBox has {} values, expected 4", numbers.len()),
            ErrorKind::InvalidData,
        )),
    }
}

fn producer(document: &Document) -> Option<String> {
    let info: &Dictionary = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match info.get(b"Producer").ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Object {
        Object::Name(n.as_bytes().to_vec())
    }

    fn one_page_pdf(media_box_on_parent: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let a4 = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ]);

        let mut page = Dictionary::new();
        page.set("Type", name("Page"));
        page.set("Parent", Object::Reference(pages_id));
        let mut pages = Dictionary::new();
        pages.set("Type", name("Pages"));
        pages.set("Count", Object::Integer(1));
        if media_box_on_parent {
            pages.set("MediaBox", a4);
        } else {
            page.set("MediaBox", a4);
        }
        let page_id = doc.add_object(Object::Dictionary(page));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut info = Dictionary::new();
        info.set("Producer", Object::string_literal("labcert test"));
        let info_id = doc.add_object(Object::Dictionary(info));
        let mut catalog = Dictionary::new();
        catalog.set("Type", name("Catalog"));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn reads_page_box_and_producer() {
        let summary = summarize(&one_page_pdf(false)).unwrap();
        assert_eq!(summary.page_count(), 1);
        assert!((summary.pages[0].width - 595.28).abs() < 0.01);
        assert!((summary.pages[0].height - 841.89).abs() < 0.01);
        assert_eq!(summary.producer.as_deref(), Some("labcert test"));
    }

    #[test]
    fn media_box_is_inherited_from_parent() {
        let boxes = page_boxes(&one_page_pdf(true)).unwrap();
        assert_eq!(boxes.len(), 1);
        assert!((boxes[0].height - 841.89).abs() < 0.01);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = page_count(b"not a pdf").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PdfError(_)));
        assert!(err.to_string().len() > "Failed to parse PDF: ".len());
    }
}
