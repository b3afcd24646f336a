//! Heading text cleanup.

use regex::Regex;

use crate::error::Result;
use crate::model::{Heading, HeadingCandidate};

/// Cleaned headings must be longer than this many characters.
pub const MIN_CLEAN_CHARS: usize = 2;

/// Cleans raw heading text and rejects degenerate results.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    trailing_page_number: Regex,
}

impl TextNormalizer {
    /// Create a normalizer.
    pub fn new() -> Result<Self> {
        Ok(Self {
            trailing_page_number: Regex::new(r"\s+\d+\s*$")?,
        })
    }

    /// Clean `raw`, returning `None` when too little text survives.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let text = self.clean(raw);
        if text.chars().count() > MIN_CLEAN_CHARS {
            Some(text)
        } else {
            None
        }
    }

    /// Clean a classified candidate into a heading.
    pub fn normalize_candidate(&self, candidate: HeadingCandidate) -> Option<Heading> {
        match self.normalize(&candidate.raw_text) {
            Some(text) => Some(Heading::new(candidate.level, text, candidate.page)),
            None => {
                log::debug!(
                    "dropped heading p{}: {:?} cleans to nothing",
                    candidate.page,
                    candidate.raw_text
                );
                None
            }
        }
    }

    /// Collapse whitespace, then strip trailing page numbers and edge
    /// dots/dashes until the text is stable.
    pub fn clean(&self, raw: &str) -> String {
        let mut text = collapse_whitespace(raw);
        loop {
            let next = {
                let stripped = self.trailing_page_number.replace(&text, "");
                strip_edge_punctuation(&stripped).to_string()
            };
            if next == text {
                return text;
            }
            text = next;
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_edge_punctuation(s: &str) -> &str {
    s.trim_matches(|c: char| c == '.' || c == '-' || c.is_whitespace())
}
