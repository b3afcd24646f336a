//! Document title selection.

use crate::model::TextFragment;

/// Title used when nothing better is found.
pub const UNTITLED: &str = "Untitled Document";

/// Pick a title: metadata first, then the largest text on page 1.
pub fn select_title(metadata_title: Option<&str>, fragments: &[TextFragment]) -> String {
    if let Some(title) = metadata_title.and_then(usable_metadata_title) {
        log::debug!("title from metadata: {:?}", title);
        return title.to_string();
    }

    if let Some(title) = largest_first_page_text(fragments) {
        log::debug!("title from first page: {:?}", title);
        return title.to_string();
    }

    UNTITLED.to_string()
}

fn usable_metadata_title(title: &str) -> Option<&str> {
    let title = title.trim();
    let len = title.chars().count();
    (1..200).contains(&len).then_some(title)
}

fn largest_first_page_text(fragments: &[TextFragment]) -> Option<&str> {
    let first_page = || fragments.iter().filter(|f| f.page == 1);
    let max_size = first_page().map(|f| f.font_size).reduce(f32::max)?;

    first_page()
        .filter(|f| f.font_size == max_size)
        .map(|f| f.text.trim())
        .find(|text| {
            let len = text.chars().count();
            len > 5 && len < 200 && text.chars().any(char::is_alphabetic)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, size: f32, page: u32) -> TextFragment {
        TextFragment::new(text, size, page)
    }

    #[test]
    fn test_metadata_title_wins() {
        let fragments = vec![frag("Annual Report 2024", 24.0, 1)];
        assert_eq!(select_title(Some("  My Report "), &fragments), "My Report");
    }

    #[test]
    fn test_unusable_metadata_falls_through() {
        let fragments = vec![frag("Annual Report 2024", 24.0, 1)];
        assert_eq!(select_title(Some("   "), &fragments), "Annual Report 2024");

        let too_long = "x".repeat(200);
        assert_eq!(select_title(Some(&too_long), &fragments), "Annual Report 2024");

        let longest_ok = "x".repeat(199);
        assert_eq!(select_title(Some(&longest_ok), &fragments), longest_ok);
    }

    #[test]
    fn test_largest_first_page_fragment() {
        let fragments = vec![
            frag("Company Confidential", 10.0, 1),
            frag("Annual Report 2024", 24.0, 1),
            frag("Prepared by the board", 14.0, 1),
            frag("Much Larger On Page Two", 40.0, 2),
        ];
        assert_eq!(select_title(None, &fragments), "Annual Report 2024");
    }

    #[test]
    fn test_ties_at_max_take_first_valid() {
        let fragments = vec![
            frag("2024", 24.0, 1),
            frag("  Strategy Review  ", 24.0, 1),
            frag("Second Candidate", 24.0, 1),
        ];
        assert_eq!(select_title(None, &fragments), "Strategy Review");
    }

    #[test]
    fn test_only_max_size_is_considered() {
        let fragments = vec![frag("12345", 30.0, 1), frag("Readable heading", 20.0, 1)];
        assert_eq!(select_title(None, &fragments), UNTITLED);
    }

    #[test]
    fn test_untitled() {
        assert_eq!(select_title(None, &[]), UNTITLED);
        let fragments = vec![frag("Short", 24.0, 1), frag("— 2024 —", 24.0, 1)];
        assert_eq!(select_title(None, &fragments), UNTITLED);
    }
}
