//! Heading detection and outline assembly.
//!
//! The pipeline for one document:
//!
//! 1. [`FontStatistics`] computes the mean font size of all fragments.
//! 2. [`HeadingClassifier`] flags heading fragments and assigns levels.
//! 3. [`TextNormalizer`] cleans the candidate text.
//! 4. [`assemble`] orders by page and removes repeats.
//!
//! [`select_title`] runs independently on the metadata title and page 1.

mod assemble;
mod classifier;
mod normalize;
mod options;
pub mod rules;
mod stats;
mod title;

pub use assemble::assemble;
pub use classifier::HeadingClassifier;
pub use normalize::{TextNormalizer, MIN_CLEAN_CHARS};
pub use options::OutlineOptions;
pub use rules::{DetectionRule, LevelRule, DETECTION_RULES, LEVEL_RULES};
pub use stats::FontStatistics;
pub use title::{select_title, UNTITLED};

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{DocumentFeed, Heading, Outline, TextFragment};
use crate::parser::{ExtractOptions, FragmentSource};

/// Builds outlines from fragment feeds.
///
/// Immutable once built; share it freely across threads.
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    classifier: HeadingClassifier,
    normalizer: TextNormalizer,
}

impl OutlineExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(&OutlineOptions::default())
    }

    /// Create an extractor with custom options.
    pub fn with_options(options: &OutlineOptions) -> Result<Self> {
        Ok(Self {
            classifier: HeadingClassifier::new(options)?,
            normalizer: TextNormalizer::new()?,
        })
    }

    /// Create an extractor around an existing classifier.
    pub fn with_classifier(classifier: HeadingClassifier) -> Result<Self> {
        Ok(Self {
            classifier,
            normalizer: TextNormalizer::new()?,
        })
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &HeadingClassifier {
        &self.classifier
    }

    /// Build the outline for one document.
    pub fn extract(&self, feed: &DocumentFeed) -> Outline {
        let title = select_title(feed.metadata_title.as_deref(), &feed.fragments);
        let headings = self.headings(&feed.fragments);
        log::info!(
            "outline: {:?}, {} headings from {} fragments over {} pages",
            title,
            headings.len(),
            feed.fragments.len(),
            feed.page_count
        );
        Outline::new(title, headings)
    }

    /// Detect, clean and order the headings of one document.
    pub fn headings(&self, fragments: &[TextFragment]) -> Vec<Heading> {
        let Some(stats) = FontStatistics::from_fragments(fragments) else {
            return Vec::new();
        };
        log::debug!(
            "font baseline {:.2}pt (max {:.2}pt) over {} fragments",
            stats.avg_font_size,
            stats.max_font_size,
            stats.fragment_count
        );

        let cleaned = fragments
            .iter()
            .filter_map(|f| self.classifier.candidate(f, stats.avg_font_size))
            .filter_map(|c| self.normalizer.normalize_candidate(c))
            .collect();
        assemble(cleaned)
    }

    /// Load a document and build its outline, never failing.
    ///
    /// If `load` returns an error or anything panics, the result is
    /// [`Outline::failed`] for `document_name`.
    pub fn extract_with<F>(&self, document_name: &str, load: F) -> Outline
    where
        F: FnOnce() -> Result<DocumentFeed>,
    {
        match self.try_extract_with(load) {
            Ok(outline) => outline,
            Err(e) => {
                log::warn!("Failed to process {}: {}", document_name, e);
                Outline::failed(document_name)
            }
        }
    }

    /// Build the outline of a PDF file, never failing.
    ///
    /// The document name used for a failed outline is the file name.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P, options: &ExtractOptions) -> Outline {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.extract_with(&name, || {
            FragmentSource::open_with_options(path, options.clone())?.feed()
        })
    }

    /// Build the outline of an in-memory PDF, never failing.
    pub fn extract_bytes(
        &self,
        document_name: &str,
        data: &[u8],
        options: &ExtractOptions,
    ) -> Outline {
        self.extract_with(document_name, || {
            FragmentSource::from_bytes_with_options(data, options.clone())?.feed()
        })
    }

    /// Load a document and build its outline, turning panics into errors.
    pub fn try_extract_with<F>(&self, load: F) -> Result<Outline>
    where
        F: FnOnce() -> Result<DocumentFeed>,
    {
        panic::catch_unwind(AssertUnwindSafe(|| load().map(|feed| self.extract(&feed))))
            .unwrap_or_else(|payload| Err(Error::Aborted(panic_message(payload.as_ref()))))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
