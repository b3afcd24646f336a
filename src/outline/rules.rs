//! Heading rule tables.
//!
//! Detection and level assignment are two independent, ordered lists of
//! rules. Detection is a logical OR over its table: a fragment is a heading
//! if any rule fires. Level assignment walks its table top to bottom and the
//! first matching rule decides the level. A fragment flagged by a keyword can
//! therefore receive its level from an unrelated size rule.

use crate::model::HeadingLevel;

/// Keywords that flag a fragment as a heading when found anywhere in its text.
pub const HEADING_KEYWORDS: &[&str] = &[
    "introduction",
    "abstract",
    "summary",
    "conclusion",
    "discussion",
    "results",
    "methods",
    "methodology",
    "analysis",
    "background",
    "literature",
    "review",
    "objectives",
    "goals",
    "findings",
    "recommendations",
    "references",
    "bibliography",
    "appendix",
    "chapter",
    "section",
    "part",
    "overview",
    "approach",
    "framework",
];

/// Keywords that mark a top-level section.
pub const MAJOR_KEYWORDS: &[&str] = &[
    "introduction",
    "conclusion",
    "abstract",
    "summary",
    "references",
];

/// Keywords that mark a second-level section.
pub const MINOR_KEYWORDS: &[&str] = &["methods", "results", "discussion", "analysis", "background"];

/// A rule that can flag a fragment as a heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionRule {
    /// Font size ratio to the document baseline exceeds `above`.
    SizeRatio { above: f32 },
    /// Bold and font size ratio exceeds `above`.
    BoldSizeRatio { above: f32 },
    /// Text matches a structural pattern (anchored at the start).
    Pattern {
        name: &'static str,
        source: &'static str,
    },
    /// Text is fully uppercase and its length lies strictly between the bounds.
    AllCaps { min_len: usize, max_len: usize },
    /// Lower-cased text contains one of the keywords.
    Keyword(&'static [&'static str]),
}

impl DetectionRule {
    /// Regex source, for pattern rules.
    pub fn pattern(&self) -> Option<&'static str> {
        match self {
            DetectionRule::Pattern { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            DetectionRule::SizeRatio { .. } => "size-ratio",
            DetectionRule::BoldSizeRatio { .. } => "bold-size-ratio",
            DetectionRule::Pattern { name, .. } => name,
            DetectionRule::AllCaps { .. } => "all-caps",
            DetectionRule::Keyword(_) => "keyword",
        }
    }
}

/// Default detection table.
pub const DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule::SizeRatio { above: 1.2 },
    DetectionRule::BoldSizeRatio { above: 1.05 },
    DetectionRule::Pattern {
        name: "numbered",
        source: r"^\d+\.?\s+[A-Z]",
    },
    DetectionRule::Pattern {
        name: "caps-phrase",
        source: r"^[A-Z][A-Z\s&:]+$",
    },
    DetectionRule::Pattern {
        name: "chapter",
        source: r"^Chapter\s+\d+[:\-\s]*[A-Za-z\s]*$",
    },
    DetectionRule::Pattern {
        name: "section",
        source: r"^Section\s+\d+[:\-\s]*[A-Za-z\s]*$",
    },
    DetectionRule::Pattern {
        name: "appendix",
        source: r"^Appendix\s+[A-Z\d]+[:\-\s]*[A-Za-z\s]*$",
    },
    DetectionRule::Pattern {
        name: "sub-numbered",
        source: r"^\d+\.\d+\.?\s+[A-Za-z]",
    },
    DetectionRule::Pattern {
        name: "sub-sub-numbered",
        source: r"^\d+\.\d+\.\d+\.?\s+[A-Za-z]",
    },
    DetectionRule::Pattern {
        name: "title-case",
        source: r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s*$",
    },
    DetectionRule::Pattern {
        name: "part",
        source: r"^[A-Z][a-z]+\s+\d+[:\-\s]*[A-Za-z\s]*$",
    },
    DetectionRule::Pattern {
        name: "roman",
        source: r"^\([IVX]+\)\s+[A-Za-z]",
    },
    DetectionRule::Pattern {
        name: "lettered",
        source: r"^[A-Z]\.\s+[A-Za-z]",
    },
    DetectionRule::AllCaps {
        min_len: 3,
        max_len: 50,
    },
    DetectionRule::Keyword(HEADING_KEYWORDS),
];

/// A rule that assigns a heading level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelRule {
    /// Text matches the pattern. Case handling is part of the source.
    Pattern {
        source: &'static str,
        level: HeadingLevel,
    },
    /// Font size ratio exceeds `above`.
    SizeRatio { above: f32, level: HeadingLevel },
    /// Bold, and the font size ratio exceeds `above` when given.
    Bold {
        above: Option<f32>,
        level: HeadingLevel,
    },
    /// Lower-cased text contains one of the keywords.
    Keyword {
        keywords: &'static [&'static str],
        level: HeadingLevel,
    },
    /// Always matches.
    Default(HeadingLevel),
}

impl LevelRule {
    /// Regex source, for pattern rules.
    pub fn pattern(&self) -> Option<&'static str> {
        match self {
            LevelRule::Pattern { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Level assigned when the rule matches.
    pub fn level(&self) -> HeadingLevel {
        match self {
            LevelRule::Pattern { level, .. }
            | LevelRule::SizeRatio { level, .. }
            | LevelRule::Bold { level, .. }
            | LevelRule::Keyword { level, .. }
            | LevelRule::Default(level) => *level,
        }
    }
}

/// Default level table, in precedence order.
pub const LEVEL_RULES: &[LevelRule] = &[
    LevelRule::Pattern {
        source: r"^\d+\.?\s+[A-Za-z]",
        level: HeadingLevel::H1,
    },
    LevelRule::Pattern {
        source: r"^\d+\.\d+\.?\s+[A-Za-z]",
        level: HeadingLevel::H2,
    },
    LevelRule::Pattern {
        source: r"^\d+\.\d+\.\d+\.?\s+[A-Za-z]",
        level: HeadingLevel::H3,
    },
    LevelRule::Pattern {
        source: r"(?i)^Chapter\s+\d+",
        level: HeadingLevel::H1,
    },
    LevelRule::Pattern {
        source: r"(?i)^Section\s+\d+",
        level: HeadingLevel::H2,
    },
    LevelRule::SizeRatio {
        above: 1.6,
        level: HeadingLevel::H1,
    },
    LevelRule::SizeRatio {
        above: 1.3,
        level: HeadingLevel::H2,
    },
    LevelRule::SizeRatio {
        above: 1.1,
        level: HeadingLevel::H3,
    },
    LevelRule::Bold {
        above: Some(1.15),
        level: HeadingLevel::H2,
    },
    LevelRule::Bold {
        above: None,
        level: HeadingLevel::H3,
    },
    LevelRule::Keyword {
        keywords: MAJOR_KEYWORDS,
        level: HeadingLevel::H1,
    },
    LevelRule::Keyword {
        keywords: MINOR_KEYWORDS,
        level: HeadingLevel::H2,
    },
    LevelRule::Default(HeadingLevel::H3),
];
