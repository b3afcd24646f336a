//! Outline engine options.

/// Options for heading detection.
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    /// Match structural patterns with their exact letter case
    pub case_sensitive_patterns: bool,

    /// Fragments shorter than this (in characters) are never headings
    pub min_heading_chars: usize,

    /// Fragments longer than this (in characters) are never headings
    pub max_heading_chars: usize,
}

impl OutlineOptions {
    /// Create new outline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match structural patterns case-sensitively.
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive_patterns = true;
        self
    }

    /// Set whether structural patterns are matched case-sensitively.
    pub fn with_case_sensitive(mut self, sensitive: bool) -> Self {
        self.case_sensitive_patterns = sensitive;
        self
    }

    /// Set the accepted heading length window (inclusive, in characters).
    pub fn with_length_window(mut self, min: usize, max: usize) -> Self {
        self.min_heading_chars = min;
        self.max_heading_chars = max.max(min);
        self
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            case_sensitive_patterns: false,
            min_heading_chars: 3,
            max_heading_chars: 100,
        }
    }
}
