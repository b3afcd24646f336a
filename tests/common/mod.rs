//! Shared helpers for integration tests: small PDFs built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One line of text on a page.
pub struct Line {
    pub text: &'static str,
    pub size: i64,
    pub bold: bool,
}

pub fn heading(text: &'static str, size: i64) -> Line {
    Line {
        text,
        size,
        bold: true,
    }
}

pub fn body(text: &'static str) -> Line {
    Line {
        text,
        size: 10,
        bold: false,
    }
}

/// Build a PDF with one page per entry of `pages`, lines laid out top down.
pub fn build_pdf(title: Option<&str>, pages: &[Vec<Line>]) -> Vec<u8> {
    build_pdf_with(title, pages, false)
}

/// Like [`build_pdf`], with Flate-compressed streams when `compress` is set.
pub fn build_pdf_with(title: Option<&str>, pages: &[Vec<Line>], compress: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(lines)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }

    if compress {
        doc.compress();
    }

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn page_content(lines: &[Line]) -> Vec<u8> {
    let mut operations = Vec::new();
    let mut y = 780;
    for line in lines {
        let font = if line.bold { "F2" } else { "F1" };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![font.into(), line.size.into()]));
        operations.push(Operation::new("Td", vec![72.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text)],
        ));
        operations.push(Operation::new("ET", vec![]));
        y -= 40;
    }
    Content { operations }.encode().unwrap()
}

/// A three page report with a metadata title.
///
/// Expected outline: "Quarterly Field Notes" (H1, p1), "1. Introduction"
/// (H1, p2), "1.1 Scope of work" (H2, p2), "2. Findings" (H1, p3). Page 3
/// repeats the introduction heading in capitals.
pub fn field_report(title: Option<&str>) -> Vec<u8> {
    build_pdf(title, &field_report_pages())
}

/// [`field_report`] with every content stream Flate-compressed.
pub fn compressed_field_report(title: Option<&str>) -> Vec<u8> {
    build_pdf_with(title, &field_report_pages(), true)
}

/// Number of streams in `data` that carry a `/Filter` entry.
pub fn filtered_streams(data: &[u8]) -> usize {
    let doc = Document::load_mem(data).unwrap();
    doc.objects
        .values()
        .filter(|o| matches!(o, Object::Stream(s) if s.dict.has(b"Filter")))
        .count()
}

fn field_report_pages() -> Vec<Vec<Line>> {
    vec![
        vec![
            heading("Quarterly Field Notes", 24),
            body("we walked the river bank, counted birds, and logged the weather."),
            body("the crew met at dawn, then drove north for two hours."),
            body("each site got a number, a photo, and a short note."),
        ],
        vec![
            heading("1. Introduction", 16),
            body("this season ran from may to july, with rain most weeks."),
            body("two new sites were added, both near the old mill."),
            heading("1.1 Scope of work", 12),
            body("we counted only birds seen within fifty metres."),
        ],
        vec![
            heading("2. Findings", 16),
            body("counts were up on last year, by about a fifth."),
            body("the heron pair nested again, for the third year."),
            heading("1. INTRODUCTION", 16),
        ],
    ]
}
