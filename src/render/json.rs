//! JSON rendering for outlines.

use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{Error, Result};
use crate::model::Outline;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with four-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline to JSON.
///
/// Non-ASCII text is written as-is, not escaped.
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    let mut buf = Vec::new();
    write_json(&mut buf, outline, format)?;
    String::from_utf8(buf).map_err(|e| Error::Render(format!("JSON is not UTF-8: {}", e)))
}

/// Write an outline as JSON to `writer`.
pub fn write_json<W: Write>(writer: W, outline: &Outline, format: JsonFormat) -> Result<()> {
    let result = match format {
        JsonFormat::Pretty => {
            let formatter = PrettyFormatter::with_indent(b"    ");
            outline.serialize(&mut Serializer::with_formatter(writer, formatter))
        }
        JsonFormat::Compact => outline.serialize(&mut Serializer::new(writer)),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
