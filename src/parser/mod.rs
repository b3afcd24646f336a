//! PDF parsing module: pages in, styled text fragments out.

pub mod backend;
mod layout;
mod options;
mod source;

pub use backend::{LopdfBackend, PdfBackend};
pub use layout::{style_flags_for_font, TextLine, TextSpan};
pub use options::{ErrorMode, ExtractOptions, PageSelection};
pub use source::{check_pdf_header, FragmentSource};
