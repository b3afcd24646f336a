//! Batch outline extraction over many documents.
//!
//! Documents are independent: one failing document yields a degraded outline
//! for that document only. With `parallel` set, documents are spread over the
//! rayon thread pool; reports always come back in input order.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{DocumentFeed, Outline};
use crate::outline::{OutlineExtractor, OutlineOptions};
use crate::parser::{ExtractOptions, FragmentSource};
use crate::render::{write_json, JsonFormat};

/// Options for batch processing.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Process documents in parallel
    pub parallel: bool,

    /// JSON layout of the written outlines
    pub json: JsonFormat,

    /// Fragment extraction options
    pub extract: ExtractOptions,

    /// Heading detection options
    pub outline: OutlineOptions,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json = format;
        self
    }

    /// Set fragment extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    /// Set heading detection options.
    pub fn with_outline_options(mut self, options: OutlineOptions) -> Self {
        self.outline = options;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            json: JsonFormat::Pretty,
            extract: ExtractOptions::default(),
            outline: OutlineOptions::default(),
        }
    }
}

/// Result of processing one document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// Document name (file name for files)
    pub name: String,

    /// Input path, when read from disk
    pub source: Option<PathBuf>,

    /// Written JSON path, when written to disk
    pub output: Option<PathBuf>,

    /// The outline, degraded if the document failed
    pub outline: Outline,

    /// Why the document failed, if it did
    pub error: Option<String>,

    /// Why the JSON could not be written, if it could not
    pub write_error: Option<String>,

    /// Wall time spent on this document
    pub elapsed: Duration,
}

impl DocumentReport {
    /// Whether the outline was built and written without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.write_error.is_none()
    }

    /// Number of headings found.
    pub fn heading_count(&self) -> usize {
        self.outline.len()
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One report per input, in input order
    pub documents: Vec<DocumentReport>,

    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of documents processed.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if no documents were processed.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents fully processed.
    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| d.is_success()).count()
    }

    /// Number of documents with an extraction or write error.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Headings found across all documents.
    pub fn total_headings(&self) -> usize {
        self.documents.iter().map(DocumentReport::heading_count).sum()
    }
}

/// List the PDF files directly inside `dir`, sorted by path.
pub fn find_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Extract outlines for every PDF in `input_dir`, writing `<stem>.json` files
/// into `output_dir`.
pub fn process_directory<P, Q>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    process_directory_with_progress(input_dir, output_dir, options, |_| {})
}

/// Like [`process_directory`], calling `on_done` as each document finishes.
///
/// With parallel processing `on_done` runs on worker threads, in completion
/// order.
pub fn process_directory_with_progress<P, Q, F>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
    on_done: F,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: Fn(&DocumentReport) + Sync,
{
    let start = Instant::now();
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    fs::create_dir_all(output_dir)?;
    let pdfs = find_pdfs(input_dir)?;
    if pdfs.is_empty() {
        log::warn!("No PDF files found in {}", input_dir.display());
        return Ok(BatchReport::default());
    }
    log::info!("Processing {} PDF files from {}", pdfs.len(), input_dir.display());

    let extractor = OutlineExtractor::with_options(&options.outline)?;

    let process = |path: PathBuf| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let extract = options.extract.clone();
        let mut report = run_one(&extractor, name, || {
            FragmentSource::open_with_options(&path, extract)?.feed()
        });

        let mut file_name = path.file_stem().unwrap_or(path.as_os_str()).to_os_string();
        file_name.push(".json");
        let output = output_dir.join(file_name);
        if let Err(e) = write_outline(&output, &report.outline, options.json) {
            log::warn!("Failed to write {}: {}", output.display(), e);
            report.write_error = Some(e.to_string());
        }
        report.source = Some(path);
        report.output = Some(output);

        on_done(&report);
        report
    };

    let documents = run_all(pdfs, options.parallel, process);
    let report = BatchReport {
        documents,
        elapsed: start.elapsed(),
    };
    log::info!(
        "Batch done: {} succeeded, {} failed, {} headings in {:.2}s",
        report.succeeded(),
        report.failed(),
        report.total_headings(),
        report.elapsed.as_secs_f64()
    );
    Ok(report)
}

/// Extract outlines for in-memory documents given as `(name, loader)` pairs.
///
/// Nothing is written; the outlines are in the returned reports.
pub fn process_documents<F>(
    documents: Vec<(String, F)>,
    options: &BatchOptions,
) -> Result<BatchReport>
where
    F: FnOnce() -> Result<DocumentFeed> + Send,
{
    let start = Instant::now();
    let extractor = OutlineExtractor::with_options(&options.outline)?;

    let documents = run_all(documents, options.parallel, |(name, load)| {
        run_one(&extractor, name, load)
    });
    Ok(BatchReport {
        documents,
        elapsed: start.elapsed(),
    })
}

fn run_all<T, F>(items: Vec<T>, parallel: bool, process: F) -> Vec<DocumentReport>
where
    T: Send,
    F: Fn(T) -> DocumentReport + Sync + Send,
{
    if parallel {
        items.into_par_iter().map(process).collect()
    } else {
        items.into_iter().map(process).collect()
    }
}

fn run_one<F>(extractor: &OutlineExtractor, name: String, load: F) -> DocumentReport
where
    F: FnOnce() -> Result<DocumentFeed>,
{
    let start = Instant::now();
    let (outline, error) = match extractor.try_extract_with(load) {
        Ok(outline) => (outline, None),
        Err(e) => {
            log::warn!("Failed to process {}: {}", name, e);
            (Outline::failed(&name), Some(e.to_string()))
        }
    };

    DocumentReport {
        name,
        source: None,
        output: None,
        outline,
        error,
        write_error: None,
        elapsed: start.elapsed(),
    }
}

fn write_outline(path: &Path, outline: &Outline, format: JsonFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, outline, format)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{HeadingLevel, TextFragment};

    type Loader = Box<dyn FnOnce() -> Result<DocumentFeed> + Send>;

    fn feed_loader(heading: &'static str) -> Loader {
        Box::new(move || {
            Ok(DocumentFeed::new(vec![
                TextFragment::new(heading, 20.0, 1),
                TextFragment::new("plain words, nothing else here", 10.0, 1),
                TextFragment::new("more plain words, still nothing", 10.0, 2),
            ]))
        })
    }

    fn documents() -> Vec<(String, Loader)> {
        vec![
            ("a.pdf".to_string(), feed_loader("1. Scope")),
            (
                "b.pdf".to_string(),
                Box::new(|| Err(Error::UnknownFormat)) as Loader,
            ),
            (
                "c.pdf".to_string(),
                Box::new(|| -> Result<DocumentFeed> { panic!("corrupt xref") }) as Loader,
            ),
            ("d.pdf".to_string(), feed_loader("2. Delivery")),
        ]
    }

    #[test]
    fn test_failures_are_contained() {
        for parallel in [true, false] {
            let options = BatchOptions::new().with_parallel(parallel);
            let report = process_documents(documents(), &options).unwrap();

            let names: Vec<_> = report.documents.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
            assert_eq!(report.succeeded(), 2);
            assert_eq!(report.failed(), 2);

            let a = &report.documents[0];
            assert_eq!(a.outline.headings[0].text, "1. Scope");
            assert_eq!(a.outline.headings[0].level, HeadingLevel::H1);

            let b = &report.documents[1];
            assert_eq!(b.outline, Outline::failed("b.pdf"));
            assert!(b.error.as_deref().unwrap().contains("Unknown file format"));

            let c = &report.documents[2];
            assert_eq!(c.outline.title, "Error processing c.pdf");
            assert!(c.error.as_deref().unwrap().contains("corrupt xref"));

            assert_eq!(report.documents[3].heading_count(), 1);
        }
    }

    #[test]
    fn test_find_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let found: Vec<_> = find_pdfs(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_empty_directory() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let report =
            process_directory(input.path(), output.path(), &BatchOptions::default()).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.total_headings(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_errors_are_reported() {
        let result = write_outline(
            Path::new("/dev/full"),
            &Outline::failed("x.pdf"),
            JsonFormat::Pretty,
        );
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_missing_input_directory() {
        let output = tempfile::tempdir().unwrap();
        let result =
            process_directory("/nonexistent/input", output.path(), &BatchOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
