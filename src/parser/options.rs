//! Extraction options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options for reading fragments out of a PDF.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Page selection (which pages to read)
    pub pages: PageSelection,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first unreadable page.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Skip unreadable pages and keep going.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            pages: PageSelection::All,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    Strict,
    /// Skip invalid content and continue
    #[default]
    Lenient,
}

/// Page selection for extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages as disjoint ranges (1-indexed, sorted by start)
    Pages(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Select individual pages.
    pub fn pages<I: IntoIterator<Item = u32>>(pages: I) -> Self {
        PageSelection::Pages(merge_ranges(pages.into_iter().map(|p| p..=p).collect()))
    }

    /// Parse a page selection string (e.g., "all", "1-10", "1,3,5-7").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let start = parse_page(start).ok_or_else(invalid)?;
                let end = parse_page(end).ok_or_else(invalid)?;
                if start > end {
                    return Err(invalid());
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page(start).ok_or_else(invalid)?;
                    let end = parse_page(end).ok_or_else(invalid)?;
                    if start > end {
                        return Err(invalid());
                    }
                    ranges.push(start..=end);
                }
                None => {
                    let page = parse_page(part).ok_or_else(invalid)?;
                    ranges.push(page..=page);
                }
            }
        }

        Ok(PageSelection::Pages(merge_ranges(ranges)))
    }
}

/// Sort ranges and join the ones that overlap or touch.
fn merge_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_by_key(|r| (*r.start(), *r.end()));

    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if *range.start() <= last.end().saturating_add(1) => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Page numbers are 1-indexed; zero is rejected.
fn parse_page(s: &str) -> Option<u32> {
    s.trim().parse().ok().filter(|&p| p > 0)
}
