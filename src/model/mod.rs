//! Data model shared by the fragment source and the outline engine.
//!
//! Fragments flow in, outlines flow out. Neither side knows about lopdf.

mod fragment;
mod outline;

pub use fragment::{style, DocumentFeed, TextFragment};
pub use outline::{Heading, HeadingCandidate, HeadingLevel, Outline};
