//! Styled text fragments: the input of outline extraction.

use serde::{Deserialize, Serialize};

/// Span style bits, using the same layout as common PDF text extractors.
pub mod style {
    /// Italic span.
    pub const ITALIC: u32 = 1 << 1;
    /// Serifed font.
    pub const SERIFED: u32 = 1 << 2;
    /// Monospaced font.
    pub const MONOSPACED: u32 = 1 << 3;
    /// Bold span.
    pub const BOLD: u32 = 1 << 4;
}

/// One visual line of text on a page, with a single representative style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Line text, already whitespace-joined
    pub text: String,

    /// Largest span font size on the line, in points
    pub font_size: f32,

    /// Style bitmask (see [`style`])
    pub style_flags: u32,

    /// Page number (1-indexed)
    pub page: u32,
}

impl TextFragment {
    /// Create a fragment with no style bits set.
    pub fn new(text: impl Into<String>, font_size: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            style_flags: 0,
            page,
        }
    }

    /// Set the style bitmask.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.style_flags = flags;
        self
    }

    /// Mark the fragment bold.
    pub fn bold(mut self) -> Self {
        self.style_flags |= style::BOLD;
        self
    }

    /// Whether the bold bit is set.
    pub fn is_bold(&self) -> bool {
        self.style_flags & style::BOLD != 0
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Everything outline extraction needs from one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFeed {
    /// Fragments in reading order
    pub fragments: Vec<TextFragment>,

    /// Title from the document info dictionary, if any
    pub metadata_title: Option<String>,

    /// Total number of pages in the document
    pub page_count: u32,
}

impl DocumentFeed {
    /// Create a feed from fragments alone.
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        let page_count = fragments.iter().map(|f| f.page).max().unwrap_or(0);
        Self {
            fragments,
            metadata_title: None,
            page_count,
        }
    }

    /// Set the metadata title.
    pub fn with_metadata_title(mut self, title: impl Into<String>) -> Self {
        self.metadata_title = Some(title.into());
        self
    }

    /// Set the page count.
    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }

    /// Fragments on the first page.
    pub fn first_page(&self) -> impl Iterator<Item = &TextFragment> {
        self.fragments.iter().filter(|f| f.page == 1)
    }

    /// Check if the feed carries no text.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_flag() {
        let plain = TextFragment::new("Body", 10.0, 1);
        assert!(!plain.is_bold());

        let bold = TextFragment::new("Heading", 10.0, 1).bold();
        assert!(bold.is_bold());
        assert_eq!(bold.style_flags, 16);

        let italic_only = TextFragment::new("Aside", 10.0, 1).with_flags(style::ITALIC);
        assert!(!italic_only.is_bold());
    }

    #[test]
    fn test_char_len_counts_scalars() {
        let frag = TextFragment::new("Résumé", 10.0, 1);
        assert_eq!(frag.char_len(), 6);
    }

    #[test]
    fn test_feed_first_page() {
        let feed = DocumentFeed::new(vec![
            TextFragment::new("Cover", 20.0, 1),
            TextFragment::new("Body", 10.0, 2),
            TextFragment::new("Subtitle", 14.0, 1),
        ]);
        assert_eq!(feed.page_count, 2);
        let first: Vec<_> = feed.first_page().map(|f| f.text.as_str()).collect();
        assert_eq!(first, vec!["Cover", "Subtitle"]);
    }
}
