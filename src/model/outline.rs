//! Outline types: the output of outline extraction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading hierarchy depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top-level heading
    H1,
    /// Section heading
    H2,
    /// Subsection heading
    H3,
}

impl HeadingLevel {
    /// Numeric depth (1 = H1).
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Label as used in the JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fragment accepted as a heading, before its text is cleaned.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    pub level: HeadingLevel,
    pub raw_text: String,
    pub page: u32,
}

/// A heading in the final outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Hierarchy level
    pub level: HeadingLevel,

    /// Cleaned heading text
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,
}

impl Heading {
    /// Create a new heading.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Title plus ordered headings for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title
    pub title: String,

    /// Headings ordered by page
    #[serde(rename = "outline")]
    pub headings: Vec<Heading>,
}

impl Outline {
    /// Create an outline.
    pub fn new(title: impl Into<String>, headings: Vec<Heading>) -> Self {
        Self {
            title: title.into(),
            headings,
        }
    }

    /// Outline returned when a document could not be read.
    pub fn failed(document_name: &str) -> Self {
        Self {
            title: format!("Error processing {}", document_name),
            headings: Vec::new(),
        }
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.headings.len()
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Count headings at a given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.headings.iter().filter(|h| h.level == level).count()
    }
}
