//! # pdfoutline
//!
//! Heading outline extraction for PDF documents.
//!
//! Reads the styled text lines of a PDF, flags headings from typography and
//! text patterns, assigns them H1/H2/H3 levels and returns a deduplicated,
//! page-ordered outline together with a document title.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline_from_file, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = extract_outline_from_file("document.pdf")?;
//!     println!("{}", render::to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layered heading rules**: numbering, structural patterns, font size
//!   ratios, boldness and keywords
//! - **Per-document baseline**: thresholds adapt to each document's body size
//! - **Failure containment**: a broken document yields a placeholder outline
//! - **Parallel batches**: Uses Rayon to process directories of PDFs

pub mod batch;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{process_directory, BatchOptions, BatchReport, DocumentReport};
pub use error::{Error, Result};
pub use model::{DocumentFeed, Heading, HeadingLevel, Outline, TextFragment};
pub use outline::{OutlineExtractor, OutlineOptions};
pub use parser::{ErrorMode, ExtractOptions, FragmentSource, PageSelection};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Build the outline for an already extracted fragment feed.
///
/// # Example
///
/// ```
/// use pdfoutline::{extract_outline, DocumentFeed, HeadingLevel, TextFragment};
///
/// let feed = DocumentFeed::new(vec![
///     TextFragment::new("1. Introduction", 18.0, 1),
///     TextFragment::new("plain body text, set at the usual size", 10.0, 1),
/// ]);
/// let outline = extract_outline(&feed).unwrap();
/// assert_eq!(outline.title, "1. Introduction");
/// assert_eq!(outline.headings[0].level, HeadingLevel::H1);
/// ```
pub fn extract_outline(feed: &DocumentFeed) -> Result<Outline> {
    Ok(OutlineExtractor::new()?.extract(feed))
}

/// Extract the outline of a PDF file.
///
/// A file that cannot be read or parsed yields [`Outline::failed`] named after
/// the file; the cause is logged. Unreadable pages are skipped.
///
/// # Errors
///
/// Only if the heading rules fail to compile.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline_from_file;
///
/// let outline = extract_outline_from_file("document.pdf").unwrap();
/// for heading in &outline.headings {
///     println!("{} {} (p. {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    extract_outline_from_file_with_options(
        path,
        &ExtractOptions::default(),
        &OutlineOptions::default(),
    )
}

/// Extract the outline of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{
///     extract_outline_from_file_with_options, ExtractOptions, OutlineOptions, PageSelection,
/// };
///
/// let extract = ExtractOptions::new()
///     .strict()
///     .with_pages(PageSelection::Range(1..=10));
/// let options = OutlineOptions::new().case_sensitive();
/// let outline =
///     extract_outline_from_file_with_options("document.pdf", &extract, &options).unwrap();
/// ```
pub fn extract_outline_from_file_with_options<P: AsRef<Path>>(
    path: P,
    extract: &ExtractOptions,
    outline: &OutlineOptions,
) -> Result<Outline> {
    Ok(OutlineExtractor::with_options(outline)?.extract_file(path, extract))
}

/// Extract the outline of a PDF held in memory.
///
/// `document_name` names the placeholder outline if the data is unusable.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline_from_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let outline = extract_outline_from_bytes(&data, "document.pdf").unwrap();
/// ```
pub fn extract_outline_from_bytes(data: &[u8], document_name: &str) -> Result<Outline> {
    Ok(OutlineExtractor::new()?.extract_bytes(document_name, data, &ExtractOptions::default()))
}

/// Extract the outline of a PDF from a reader.
pub fn extract_outline_from_reader<R: Read>(reader: R, document_name: &str) -> Result<Outline> {
    let extractor = OutlineExtractor::new()?;
    Ok(extractor.extract_with(document_name, || FragmentSource::from_reader(reader)?.feed()))
}

/// Extract the outline of a PDF file as JSON.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{to_json, JsonFormat};
///
/// let json = to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let outline = extract_outline_from_file(path)?;
    render::to_json(&outline, format)
}
