//! pdfoutline CLI - PDF heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{find_pdfs, process_directory_with_progress, DocumentReport};
use pdfoutline::{
    BatchOptions, ExtractOptions, FragmentSource, JsonFormat, OutlineExtractor, OutlineOptions,
    PageSelection,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract heading outlines from PDF files", long_about = None)]
struct Cli {
    /// Directory of PDF files to process
    #[arg(value_name = "INPUT_DIR", env = "PDFOUTLINE_INPUT")]
    input: Option<PathBuf>,

    /// Directory to write <name>.json outlines into
    #[arg(value_name = "OUTPUT_DIR", env = "PDFOUTLINE_OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of a single PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Extract outlines for every PDF in a directory
    Batch {
        /// Directory of PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory to write <name>.json outlines into
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        /// Process one document at a time
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Dump the styled text fragments of a PDF as JSON
    Fragments {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show version information
    Version,
}

/// Flags shared by the outline commands.
#[derive(Args, Clone, Copy, Default)]
struct DetectionArgs {
    /// Fail on the first unreadable page instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Match structural heading patterns with exact letter case
    #[arg(long)]
    case_sensitive: bool,
}

impl DetectionArgs {
    fn extract_options(self, pages: PageSelection) -> ExtractOptions {
        let options = ExtractOptions::new().with_pages(pages);
        if self.strict {
            options.strict()
        } else {
            options.lenient()
        }
    }

    fn outline_options(self) -> OutlineOptions {
        OutlineOptions::new().with_case_sensitive(self.case_sensitive)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            compact,
            pages,
            detection,
        }) => cmd_extract(
            &input,
            output.as_deref(),
            compact,
            pages.as_deref(),
            detection,
        ),
        Some(Commands::Batch {
            input,
            output,
            sequential,
            compact,
            detection,
        }) => cmd_batch(&input, &output, sequential, compact, detection),
        Some(Commands::Fragments {
            input,
            output,
            pages,
        }) => cmd_fragments(&input, output.as_deref(), pages.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match (cli.input, cli.output) {
            // Default behavior: batch a directory
            (Some(input), Some(output)) => {
                cmd_batch(&input, &output, false, false, DetectionArgs::default())
            }
            _ => {
                println!("{}", "Usage: pdfoutline <INPUT_DIR> <OUTPUT_DIR>".yellow());
                println!("       pdfoutline --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn parse_pages(pages: Option<&str>) -> pdfoutline::Result<PageSelection> {
    pages.map_or(Ok(PageSelection::All), PageSelection::parse)
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    pages: Option<&str>,
    detection: DetectionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extract = detection.extract_options(parse_pages(pages)?);
    let extractor = OutlineExtractor::with_options(&detection.outline_options())?;

    let outline = extractor
        .try_extract_with(|| FragmentSource::open_with_options(input, extract)?.feed())?;

    let json = pdfoutline::render::to_json(&outline, json_format(compact))?;
    write_or_print(output, &json)
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    sequential: bool,
    compact: bool,
    detection: DetectionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = find_pdfs(input)?.len();
    if total == 0 {
        println!(
            "{} No PDF files found in {}",
            "Warning:".yellow().bold(),
            input.display()
        );
        return Ok(());
    }
    println!("{} {} PDF files", "Found".cyan(), total);

    let options = BatchOptions::new()
        .with_parallel(!sequential)
        .with_json_format(json_format(compact))
        .with_extract_options(detection.extract_options(PageSelection::All))
        .with_outline_options(detection.outline_options());

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = process_directory_with_progress(input, output, &options, |doc| {
        pb.set_message(doc.name.clone());
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    for doc in &report.documents {
        print_summary(doc);
    }

    println!(
        "\n{} {} documents, {} headings, {} failed ({:.2}s)",
        "Done!".green().bold(),
        report.len(),
        report.total_headings(),
        report.failed(),
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

fn print_summary(doc: &DocumentReport) {
    let secs = doc.elapsed.as_secs_f64();
    match (&doc.error, &doc.write_error) {
        (None, None) => println!(
            "  {} {}: {} headings found in {:.2}s",
            "✓".green().bold(),
            doc.name.bright_white(),
            doc.heading_count(),
            secs
        ),
        (Some(e), _) => println!(
            "  {} {}: {} ({})",
            "✗".red().bold(),
            doc.name.bright_white(),
            doc.outline.title,
            e.dimmed()
        ),
        (None, Some(e)) => println!(
            "  {} {}: could not write output ({})",
            "✗".red().bold(),
            doc.name.bright_white(),
            e.dimmed()
        ),
    }
}

fn cmd_fragments(
    input: &Path,
    output: Option<&Path>,
    pages: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractOptions::new().with_pages(parse_pages(pages)?);
    let feed = FragmentSource::open_with_options(input, options)?.feed()?;
    let json = serde_json::to_string_pretty(&feed)?;
    write_or_print(output, &json)
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline extraction tool");
    println!();
    println!("License: MIT");
}
