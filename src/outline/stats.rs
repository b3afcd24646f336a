//! Per-document font size baseline.

use crate::model::TextFragment;

/// Font statistics for heading detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStatistics {
    /// Mean font size over every fragment (unweighted)
    pub avg_font_size: f32,
    /// Largest font size seen
    pub max_font_size: f32,
    /// Number of fragments measured
    pub fragment_count: usize,
}

impl FontStatistics {
    /// Compute the baseline for a document. `None` when there is no text.
    pub fn from_fragments(fragments: &[TextFragment]) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }

        let total: f64 = fragments.iter().map(|f| f64::from(f.font_size)).sum();
        let max_font_size = fragments
            .iter()
            .map(|f| f.font_size)
            .fold(f32::MIN, f32::max);

        Some(Self {
            avg_font_size: (total / fragments.len() as f64) as f32,
            max_font_size,
            fragment_count: fragments.len(),
        })
    }

    /// Ratio of a font size to the baseline.
    pub fn ratio(&self, font_size: f32) -> f32 {
        size_ratio(font_size, self.avg_font_size)
    }
}

pub(crate) fn size_ratio(font_size: f32, avg_font_size: f32) -> f32 {
    if avg_font_size > 0.0 {
        font_size / avg_font_size
    } else {
        0.0
    }
}
