//! Heading detection and level assignment.

use regex::{Regex, RegexBuilder};

use super::options::OutlineOptions;
use super::rules::{DetectionRule, LevelRule, DETECTION_RULES, LEVEL_RULES};
use super::stats::size_ratio;
use crate::error::Result;
use crate::model::{HeadingCandidate, HeadingLevel, TextFragment};

/// Facts about one fragment that the rules look at.
#[derive(Debug)]
struct Signals<'a> {
    text: &'a str,
    lower: String,
    char_len: usize,
    ratio: f32,
    bold: bool,
}

impl<'a> Signals<'a> {
    fn new(fragment: &'a TextFragment, avg_font_size: f32) -> Self {
        Self {
            text: &fragment.text,
            lower: fragment.text.to_lowercase(),
            char_len: fragment.char_len(),
            ratio: size_ratio(fragment.font_size, avg_font_size),
            bold: fragment.is_bold(),
        }
    }

    fn contains_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|kw| self.lower.contains(kw))
    }

    fn is_uppercase(&self) -> bool {
        self.text.chars().any(char::is_uppercase) && !self.text.chars().any(char::is_lowercase)
    }
}

/// Classifies fragments into headings.
///
/// Holds only the compiled rule tables. The document baseline is passed in
/// on every call, so one classifier serves any number of documents.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    detection: Vec<(DetectionRule, Option<Regex>)>,
    levels: Vec<(LevelRule, Option<Regex>)>,
    min_chars: usize,
    max_chars: usize,
}

impl HeadingClassifier {
    /// Build a classifier from the default rule tables.
    pub fn new(options: &OutlineOptions) -> Result<Self> {
        Self::with_rules(DETECTION_RULES, LEVEL_RULES, options)
    }

    /// Build a classifier from custom rule tables.
    pub fn with_rules(
        detection: &[DetectionRule],
        levels: &[LevelRule],
        options: &OutlineOptions,
    ) -> Result<Self> {
        let detection = detection
            .iter()
            .map(|rule| {
                let pattern = rule
                    .pattern()
                    .map(|source| {
                        RegexBuilder::new(source)
                            .case_insensitive(!options.case_sensitive_patterns)
                            .build()
                    })
                    .transpose()?;
                Ok((*rule, pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        let levels = levels
            .iter()
            .map(|rule| Ok((*rule, rule.pattern().map(Regex::new).transpose()?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            detection,
            levels,
            min_chars: options.min_heading_chars,
            max_chars: options.max_heading_chars,
        })
    }

    /// Classify a fragment. `None` means it is not a heading.
    pub fn classify(&self, fragment: &TextFragment, avg_font_size: f32) -> Option<HeadingLevel> {
        let signals = Signals::new(fragment, avg_font_size);
        if !self.within_length(&signals) {
            return None;
        }

        let rule = self.first_detection(&signals)?;
        let level = self.level_for(&signals);
        log::debug!(
            "heading p{} [{}] via {}: {:?}",
            fragment.page,
            level,
            rule.label(),
            fragment.text
        );
        Some(level)
    }

    /// Classify a fragment into a candidate carrying its raw text and page.
    pub fn candidate(
        &self,
        fragment: &TextFragment,
        avg_font_size: f32,
    ) -> Option<HeadingCandidate> {
        self.classify(fragment, avg_font_size)
            .map(|level| HeadingCandidate {
                level,
                raw_text: fragment.text.clone(),
                page: fragment.page,
            })
    }

    /// Whether the fragment passes the length filter and any detection rule.
    pub fn is_heading(&self, fragment: &TextFragment, avg_font_size: f32) -> bool {
        let signals = Signals::new(fragment, avg_font_size);
        self.within_length(&signals) && self.first_detection(&signals).is_some()
    }

    /// The first detection rule that fires for the fragment, ignoring length.
    pub fn detected_by(
        &self,
        fragment: &TextFragment,
        avg_font_size: f32,
    ) -> Option<DetectionRule> {
        self.first_detection(&Signals::new(fragment, avg_font_size))
            .copied()
    }

    /// Level the fragment would get if it were a heading.
    pub fn level(&self, fragment: &TextFragment, avg_font_size: f32) -> HeadingLevel {
        self.level_for(&Signals::new(fragment, avg_font_size))
    }

    fn within_length(&self, signals: &Signals<'_>) -> bool {
        (self.min_chars..=self.max_chars).contains(&signals.char_len)
    }

    fn first_detection(&self, signals: &Signals<'_>) -> Option<&DetectionRule> {
        self.detection
            .iter()
            .find(|(rule, pattern)| detection_fires(rule, pattern.as_ref(), signals))
            .map(|(rule, _)| rule)
    }

    fn level_for(&self, signals: &Signals<'_>) -> HeadingLevel {
        self.levels
            .iter()
            .find(|(rule, pattern)| level_matches(rule, pattern.as_ref(), signals))
            .map(|(rule, _)| rule.level())
            .unwrap_or(HeadingLevel::H3)
    }
}

fn detection_fires(rule: &DetectionRule, pattern: Option<&Regex>, s: &Signals<'_>) -> bool {
    match rule {
        DetectionRule::SizeRatio { above } => s.ratio > *above,
        DetectionRule::BoldSizeRatio { above } => s.bold && s.ratio > *above,
        DetectionRule::Pattern { .. } => pattern.is_some_and(|re| re.is_match(s.text)),
        DetectionRule::AllCaps { min_len, max_len } => {
            s.is_uppercase() && s.char_len > *min_len && s.char_len < *max_len
        }
        DetectionRule::Keyword(keywords) => s.contains_any(keywords),
    }
}

fn level_matches(rule: &LevelRule, pattern: Option<&Regex>, s: &Signals<'_>) -> bool {
    match rule {
        LevelRule::Pattern { .. } => pattern.is_some_and(|re| re.is_match(s.text)),
        LevelRule::SizeRatio { above, .. } => s.ratio > *above,
        LevelRule::Bold { above, .. } => s.bold && above.is_none_or(|min| s.ratio > min),
        LevelRule::Keyword { keywords, .. } => s.contains_any(keywords),
        LevelRule::Default(_) => true,
    }
}
