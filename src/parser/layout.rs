//! Text span extraction and line grouping.
//!
//! Walks a page's content stream, tracking the text matrix, the current
//! transformation matrix and the current font. It emits one span per
//! text-showing operator. Spans sharing a baseline are then grouped into lines.

use std::collections::HashMap;

use super::backend::{get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue};
use crate::error::Result;
use crate::model::style;

/// Average glyph advance as a fraction of the font size. Used to estimate
/// span widths, since glyph metrics are not read.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments larger than this (thousandths of an em) read as a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position and style information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Style bitmask derived from the font name
    pub style_flags: u32,
}

impl TextSpan {
    /// Create a new text span, deriving style bits from the base font name.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32, font_name: &str) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            style_flags: style_flags_for_font(font_name),
        }
    }
}

/// Style bits implied by a base font name such as `"Times-BoldItalic"`.
pub fn style_flags_for_font(font_name: &str) -> u32 {
    let name = font_name.to_lowercase();
    let mut flags = 0;
    if name.contains("bold") || name.contains("black") || name.contains("heavy") {
        flags |= style::BOLD;
    }
    if name.contains("italic") || name.contains("oblique") {
        flags |= style::ITALIC;
    }
    if name.contains("courier") || name.contains("mono") {
        flags |= style::MONOSPACED;
    }
    if (name.contains("times") || name.contains("serif")) && !name.contains("sans") {
        flags |= style::SERIFED;
    }
    flags
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline of the first span)
    pub y: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        Self { spans, y }
    }

    /// Largest span font size on the line.
    pub fn font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.font_size).fold(0.0, f32::max)
    }

    /// Union of the span style bits.
    pub fn style_flags(&self) -> u32 {
        self.spans.iter().fold(0, |acc, s| acc | s.style_flags)
    }

    /// Combined text of all spans.
    ///
    /// A space is inserted where the horizontal gap between spans is wider
    /// than a fifth of a glyph, except between characters of scripts written
    /// without word spaces.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - (prev.x + prev.width);
                let space_threshold = span.font_size * AVG_GLYPH_WIDTH * 0.2;

                let both_spaceless = prev
                    .text
                    .chars()
                    .last()
                    .is_some_and(is_spaceless_script_char)
                    && span.text.chars().next().is_some_and(is_spaceless_script_char);
                let has_space = ends_with_space(&prev.text) || starts_with_space(&span.text);

                if gap > space_threshold && !both_spaceless && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }
}

fn ends_with_space(s: &str) -> bool {
    s.ends_with(' ') || s.ends_with('\u{00A0}')
}

fn starts_with_space(s: &str) -> bool {
    s.starts_with(' ') || s.starts_with('\u{00A0}')
}

/// Extract text spans from one page.
pub fn extract_page_spans<B: PdfBackend + ?Sized>(
    backend: &B,
    page: PageId,
) -> Result<Vec<TextSpan>> {
    let fonts: HashMap<Vec<u8>, String> = backend
        .page_fonts(page)?
        .into_iter()
        .map(|f| (f.name, f.base_font))
        .collect();

    let content = backend.page_content(page)?;
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let ops = backend.decode_content(&content)?;

    Ok(SpanWalker::new(backend, page, &fonts).run(&ops))
}

/// Content stream interpreter state.
struct SpanWalker<'a, B: ?Sized> {
    backend: &'a B,
    page: PageId,
    fonts: &'a HashMap<Vec<u8>, String>,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    matrix: TextMatrix,
    /// Current transformation matrix and the `q` save stack.
    ctm: [f32; 6],
    saved_ctm: Vec<[f32; 6]>,
    in_text_block: bool,
    spans: Vec<TextSpan>,
}

impl<'a, B: PdfBackend + ?Sized> SpanWalker<'a, B> {
    fn new(backend: &'a B, page: PageId, fonts: &'a HashMap<Vec<u8>, String>) -> Self {
        Self {
            backend,
            page,
            fonts,
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            matrix: TextMatrix::default(),
            ctm: IDENTITY,
            saved_ctm: Vec::new(),
            in_text_block: false,
            spans: Vec::new(),
        }
    }

    fn run(mut self, ops: &[ContentOp]) -> Vec<TextSpan> {
        for op in ops {
            self.apply(op);
        }
        self.spans
    }

    fn apply(&mut self, op: &ContentOp) {
        let num = |i: usize, default: f32| {
            op.operands
                .get(i)
                .and_then(get_number_from_value)
                .unwrap_or(default)
        };

        match op.operator.as_str() {
            "q" => self.saved_ctm.push(self.ctm),
            "Q" => match self.saved_ctm.pop() {
                Some(ctm) => self.ctm = ctm,
                None => log::debug!("unbalanced Q on page {:?}", self.page),
            },
            "cm" => {
                let m = [
                    num(0, 1.0),
                    num(1, 0.0),
                    num(2, 0.0),
                    num(3, 1.0),
                    num(4, 0.0),
                    num(5, 0.0),
                ];
                self.ctm = multiply(&m, &self.ctm);
            }
            "BT" => {
                self.in_text_block = true;
                self.matrix.reset();
            }
            "ET" => self.in_text_block = false,
            "Tf" => {
                if let Some(PdfValue::Name(key)) = op.operands.first() {
                    self.font_name = self
                        .fonts
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(key).into_owned());
                    self.font_key = key.clone();
                }
                self.font_size = num(1, 12.0);
            }
            "TL" => self.matrix.leading = num(0, 0.0),
            "Td" => self.matrix.translate(num(0, 0.0), num(1, 0.0)),
            "TD" => {
                let ty = num(1, 0.0);
                self.matrix.leading = -ty;
                self.matrix.translate(num(0, 0.0), ty);
            }
            "Tm" => self.matrix.set([
                num(0, 1.0),
                num(1, 0.0),
                num(2, 0.0),
                num(3, 1.0),
                num(4, 0.0),
                num(5, 0.0),
            ]),
            "T*" => self.matrix.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = self.decode(bytes);
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let text = self.decode_tj(items);
                    self.show(text);
                }
            }
            "'" | "\"" => {
                self.matrix.next_line();
                let text_idx = if op.operator == "\"" { 2 } else { 0 };
                if let Some(PdfValue::Str(bytes)) = op.operands.get(text_idx) {
                    let text = self.decode(bytes);
                    self.show(text);
                }
            }
            _ => {}
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        self.backend.decode_text(self.page, &self.font_key, bytes)
    }

    fn decode_tj(&self, items: &[PdfValue]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode(bytes)),
                other => {
                    // Negative adjustments move the pen right.
                    let Some(adjustment) = get_number_from_value(other).map(|n| -n) else {
                        continue;
                    };
                    let word_break = adjustment > TJ_SPACE_THRESHOLD
                        && !ends_with_space(&combined)
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !is_spaceless_script_char(c));
                    if word_break {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn show(&mut self, text: String) {
        if !self.in_text_block || text.trim().is_empty() {
            return;
        }
        let trm = multiply(&self.matrix.tm, &self.ctm);
        let (x, y) = (trm[4], trm[5]);
        // Glyph height follows the vertical axis of the rendering matrix.
        let scale = (trm[2] * trm[2] + trm[3] * trm[3]).sqrt();
        let span = TextSpan::new(text, x, y, self.font_size * scale, &self.font_name);
        let advance = span.text.chars().count() as f32 * self.font_size * AVG_GLYPH_WIDTH;
        self.matrix.advance(advance);
        self.spans.push(span);
    }
}

/// Text matrix and line matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    /// [a b c d e f] of the text matrix
    tm: [f32; 6],
    /// [a b c d e f] of the line matrix
    tlm: [f32; 6],
    leading: f32,
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            tm: IDENTITY,
            tlm: IDENTITY,
            leading: 0.0,
        }
    }
}

impl TextMatrix {
    fn reset(&mut self) {
        self.tm = IDENTITY;
        self.tlm = IDENTITY;
    }

    fn set(&mut self, m: [f32; 6]) {
        self.tm = m;
        self.tlm = m;
    }

    /// Start a new line offset from the start of the current one.
    fn translate(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, e, f] = self.tlm;
        self.tlm[4] = e + tx * a + ty * c;
        self.tlm[5] = f + tx * b + ty * d;
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 { self.leading } else { 12.0 };
        self.translate(0.0, -leading);
    }

    /// Move the pen along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        let [a, b, ..] = self.tm;
        self.tm[4] += tx * a;
        self.tm[5] += tx * b;
    }

}

/// Concatenate two `[a b c d e f]` matrices: `m` applied first, then `n`.
fn multiply(m: &[f32; 6], n: &[f32; 6]) -> [f32; 6] {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

/// Group spans into lines, top to bottom.
///
/// Spans whose baselines are within 30% of their font size of the current
/// line's baseline join that line.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }
    lines
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF        // CJK Unified Ideographs
        | 0x3400..=0x4DBF      // Extension A
        | 0x20000..=0x2EBEF    // Extensions B-F
        | 0x3040..=0x309F      // Hiragana
        | 0x30A0..=0x30FF      // Katakana
        | 0x3000..=0x303F      // CJK Symbols and Punctuation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::backend::BackendFontInfo;
    use std::collections::BTreeMap;

    /// Backend serving one page of prepared operations.
    struct CannedBackend {
        ops: Vec<ContentOp>,
    }

    impl PdfBackend for CannedBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }

        fn metadata_title(&self) -> Option<String> {
            None
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![
                BackendFontInfo {
                    name: b"F1".to_vec(),
                    base_font: "Helvetica".to_string(),
                },
                BackendFontInfo {
                    name: b"F2".to_vec(),
                    base_font: "Helvetica-Bold".to_string(),
                },
            ])
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(b"canned".to_vec())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(self.ops.clone())
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    fn name(s: &str) -> PdfValue {
        PdfValue::Name(s.as_bytes().to_vec())
    }

    fn string(s: &str) -> PdfValue {
        PdfValue::Str(s.as_bytes().to_vec())
    }

    fn int(i: i64) -> PdfValue {
        PdfValue::Integer(i)
    }

    #[test]
    fn test_style_flags_for_font() {
        assert_eq!(style_flags_for_font("Helvetica"), 0);
        assert_eq!(style_flags_for_font("Helvetica-Bold"), style::BOLD);
        assert_eq!(
            style_flags_for_font("Times-BoldItalic"),
            style::BOLD | style::ITALIC | style::SERIFED
        );
        assert_eq!(style_flags_for_font("Courier-Oblique"), style::MONOSPACED | style::ITALIC);
        assert_eq!(style_flags_for_font("NotoSans-Black"), style::BOLD);
    }

    #[test]
    fn test_walker_tracks_font_and_position() {
        let backend = CannedBackend {
            ops: vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F2"), int(24)]),
                ContentOp::new("Td", vec![int(72), int(720)]),
                ContentOp::new("Tj", vec![string("Annual Report")]),
                ContentOp::new("Tf", vec![name("F1"), int(10)]),
                ContentOp::new("Td", vec![int(0), int(-40)]),
                ContentOp::new("Tj", vec![string("Body text")]),
                ContentOp::new("ET", vec![]),
            ],
        };

        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Annual Report");
        assert_eq!((spans[0].x, spans[0].y), (72.0, 720.0));
        assert_eq!(spans[0].font_size, 24.0);
        assert_eq!(spans[0].style_flags, style::BOLD);
        // Td is relative to the start of the line, not the pen
        assert_eq!((spans[1].x, spans[1].y), (72.0, 680.0));
        assert_eq!(spans[1].style_flags, 0);
    }

    #[test]
    fn test_text_outside_bt_is_ignored() {
        let backend = CannedBackend {
            ops: vec![ContentOp::new("Tj", vec![string("stray")])],
        };
        assert!(extract_page_spans(&backend, (1, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_tm_scales_font_size() {
        let backend = CannedBackend {
            ops: vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F1"), int(1)]),
                ContentOp::new(
                    "Tm",
                    vec![int(18), int(0), int(0), int(18), int(50), int(500)],
                ),
                ContentOp::new("Tj", vec![string("Scaled")]),
                ContentOp::new("ET", vec![]),
            ],
        };
        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans[0].font_size, 18.0);
        assert_eq!(spans[0].y, 500.0);
    }

    #[test]
    fn test_tm_vertical_scale_sets_font_size() {
        // Horizontally condensed text keeps its height
        let backend = CannedBackend {
            ops: vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F1"), int(1)]),
                ContentOp::new(
                    "Tm",
                    vec![int(8), int(0), int(0), int(16), int(40), int(300)],
                ),
                ContentOp::new("Tj", vec![string("Condensed")]),
                ContentOp::new("ET", vec![]),
            ],
        };
        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans[0].font_size, 16.0);
        assert_eq!((spans[0].x, spans[0].y), (40.0, 300.0));
    }

    #[test]
    fn test_cm_transforms_spans_until_restored() {
        let backend = CannedBackend {
            ops: vec![
                ContentOp::new("q", vec![]),
                ContentOp::new(
                    "cm",
                    vec![int(2), int(0), int(0), int(2), int(10), int(20)],
                ),
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F2"), int(9)]),
                ContentOp::new("Td", vec![int(30), int(300)]),
                ContentOp::new("Tj", vec![string("Scaled Heading")]),
                ContentOp::new("ET", vec![]),
                ContentOp::new("Q", vec![]),
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F1"), int(9)]),
                ContentOp::new("Td", vec![int(30), int(300)]),
                ContentOp::new("Tj", vec![string("plain text")]),
                ContentOp::new("ET", vec![]),
            ],
        };
        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans[0].font_size, 18.0);
        assert_eq!((spans[0].x, spans[0].y), (70.0, 620.0));
        assert_eq!(spans[1].font_size, 9.0);
        assert_eq!((spans[1].x, spans[1].y), (30.0, 300.0));
    }

    #[test]
    fn test_multiply_applies_left_matrix_first() {
        let translate = [1.0, 0.0, 0.0, 1.0, 5.0, 0.0];
        let scale = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        assert_eq!(multiply(&translate, &scale), [2.0, 0.0, 0.0, 2.0, 10.0, 0.0]);
        assert_eq!(multiply(&scale, &translate), [2.0, 0.0, 0.0, 2.0, 5.0, 0.0]);
    }

    #[test]
    fn test_tj_word_breaks() {
        let backend = CannedBackend {
            ops: vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F1"), int(12)]),
                ContentOp::new(
                    "TJ",
                    vec![PdfValue::Array(vec![
                        string("Data"),
                        int(-300),
                        string("Analysis"),
                        int(-20),
                        string("es"),
                    ])],
                ),
                ContentOp::new("ET", vec![]),
            ],
        };
        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans[0].text, "Data Analysises");
    }

    #[test]
    fn test_quote_operator_moves_to_next_line() {
        let backend = CannedBackend {
            ops: vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F1"), int(10)]),
                ContentOp::new("TL", vec![int(14)]),
                ContentOp::new("Td", vec![int(0), int(100)]),
                ContentOp::new("Tj", vec![string("first")]),
                ContentOp::new("'", vec![string("second")]),
                ContentOp::new("ET", vec![]),
            ],
        };
        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans[1].text, "second");
        assert_eq!(spans[1].y, 86.0);
        assert_eq!(spans[1].x, 0.0);
    }

    #[test]
    fn test_group_spans_into_lines() {
        let spans = vec![
            TextSpan::new("world", 60.0, 700.0, 12.0, "Helvetica"),
            TextSpan::new("Second line", 10.0, 680.0, 12.0, "Helvetica"),
            TextSpan::new("Hello", 10.0, 701.0, 14.0, "Helvetica-Bold"),
        ];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello world");
        assert_eq!(lines[0].font_size(), 14.0);
        assert_eq!(lines[0].style_flags(), style::BOLD);
        assert_eq!(lines[1].text(), "Second line");
    }

    #[test]
    fn test_adjacent_spans_join_without_space() {
        // "Intro" at 10pt is estimated 25pt wide, so the next span touches it
        let line = TextLine::from_spans(vec![
            TextSpan::new("Intro", 0.0, 0.0, 10.0, "Helvetica"),
            TextSpan::new("duction", 25.0, 0.0, 10.0, "Helvetica"),
        ]);
        assert_eq!(line.text(), "Introduction");
    }

    #[test]
    fn test_spaceless_script_join() {
        let line = TextLine::from_spans(vec![
            TextSpan::new("概要", 0.0, 0.0, 10.0, "Mincho"),
            TextSpan::new("説明", 40.0, 0.0, 10.0, "Mincho"),
        ]);
        assert_eq!(line.text(), "概要説明");
        assert!(!is_spaceless_script_char('한'));
    }
}
