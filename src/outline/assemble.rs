//! Final ordering and deduplication of headings.

use std::collections::HashSet;

use super::normalize::MIN_CLEAN_CHARS;
use crate::model::Heading;

/// Order headings by page and drop repeats.
///
/// The sort is stable, so headings on the same page keep their encounter
/// order. Repeats are detected on lower-cased, trimmed text and the first
/// occurrence wins. Texts of `MIN_CLEAN_CHARS` characters or fewer are
/// dropped.
pub fn assemble(mut headings: Vec<Heading>) -> Vec<Heading> {
    headings.sort_by_key(|h| h.page);

    let mut seen = HashSet::new();
    headings.retain(|heading| {
        if heading.text.chars().count() <= MIN_CLEAN_CHARS {
            return false;
        }
        seen.insert(heading.text.trim().to_lowercase())
    });
    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel::{H1, H2, H3};

    #[test]
    fn test_sorted_by_page_stably() {
        let headings = vec![
            Heading::new(H2, "Later", 3),
            Heading::new(H1, "First on one", 1),
            Heading::new(H3, "Second on one", 1),
            Heading::new(H1, "Middle", 2),
        ];
        let texts: Vec<_> = assemble(headings).into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["First on one", "Second on one", "Middle", "Later"]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let headings = vec![
            Heading::new(H3, "introduction", 4),
            Heading::new(H1, "Introduction", 2),
            Heading::new(H2, " INTRODUCTION ", 2),
        ];
        let out = assemble(headings);
        assert_eq!(out, vec![Heading::new(H1, "Introduction", 2)]);
    }

    #[test]
    fn test_drops_short_text() {
        let headings = vec![Heading::new(H1, "Ab", 1), Heading::new(H1, "Abc", 1)];
        let out = assemble(headings);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Abc");
    }

    #[test]
    fn test_empty() {
        assert!(assemble(Vec::new()).is_empty());
    }
}
