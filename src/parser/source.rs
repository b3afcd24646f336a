//! Fragment source: turns a PDF into a [`DocumentFeed`].

use std::io::Read;
use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use super::backend::{LopdfBackend, PdfBackend};
use super::layout::{extract_page_spans, group_spans_into_lines, TextLine};
use super::options::{ErrorMode, ExtractOptions};
use crate::error::{Error, Result};
use crate::model::{DocumentFeed, TextFragment};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// How far into the file the header may start.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Check that `data` looks like a PDF.
pub fn check_pdf_header(data: &[u8]) -> Result<()> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Reads styled text fragments out of a PDF document.
pub struct FragmentSource<B = LopdfBackend> {
    backend: B,
    options: ExtractOptions,
}

impl FragmentSource<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ExtractOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        check_pdf_header(data)?;
        Ok(Self::with_backend(LopdfBackend::load_bytes(data)?, options))
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }
}

impl<B: PdfBackend> FragmentSource<B> {
    /// Wrap an already loaded backend.
    pub fn with_backend(backend: B, options: ExtractOptions) -> Self {
        Self { backend, options }
    }

    /// The backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Collect the fragments of every selected page, plus the metadata title.
    pub fn feed(&self) -> Result<DocumentFeed> {
        let pages = self.backend.pages();
        let page_count = pages.len() as u32;
        let mut fragments = Vec::new();

        for (&page_num, _) in pages.iter().filter(|(n, _)| self.options.pages.includes(**n)) {
            match self.page_fragments(page_num) {
                Ok(page) => fragments.extend(page),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!("{} fragments from {} pages", fragments.len(), page_count);

        Ok(DocumentFeed {
            fragments,
            metadata_title: self.backend.metadata_title(),
            page_count,
        })
    }

    /// Fragments of a single page, top to bottom.
    pub fn page_fragments(&self, page_num: u32) -> Result<Vec<TextFragment>> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let spans = extract_page_spans(&self.backend, page_id)?;
        Ok(group_spans_into_lines(spans)
            .iter()
            .filter_map(|line| line_to_fragment(line, page_num))
            .collect())
    }
}

fn line_to_fragment(line: &TextLine, page: u32) -> Option<TextFragment> {
    let text: String = line.text().trim().nfc().collect();
    if text.is_empty() {
        return None;
    }
    Some(TextFragment::new(text, line.font_size(), page).with_flags(line.style_flags()))
}
