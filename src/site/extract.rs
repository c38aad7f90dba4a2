//! Word-count extraction from flattened threadmark page text

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Sentinel written in place of a word count that could not be located
pub const WORD_COUNT_NOT_FOUND: &str = "word count not found";

/// Threadmark summary layout: `<n> threadmarks, Word Count: <count>[k|m]`
///
/// Group 1 is the threadmark descriptor, group 2 the word count with its
/// optional magnitude suffix.
pub const THREADMARK_PATTERN: &str = r"\t*((?:\d+,)?\d+[\s\w]+), Word Count: (\d+\.?\d+[kKmM]?)";

static THREADMARK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(THREADMARK_PATTERN).expect("hardcoded threadmark pattern is valid"));

/// Tokens shorter than this are kept but flagged as suspicious
const SUSPICIOUS_TOKEN_LEN: usize = 5;

/// Outcome of extracting a word count from page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The word-count text that was located
    Found(String),

    /// The markers or pattern were not present
    NotFound,
}

impl Extraction {
    /// Converts the extraction into the value stored on a thread record
    pub fn into_word_count(self) -> String {
        match self {
            Self::Found(text) => text,
            Self::NotFound => WORD_COUNT_NOT_FOUND.to_string(),
        }
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(text) => f.write_str(text),
            Self::NotFound => f.write_str(WORD_COUNT_NOT_FOUND),
        }
    }
}

/// Strategy for locating the word count inside a page's text
#[derive(Debug, Clone)]
pub enum ExtractionRule {
    /// The word count sits between a start marker and an end marker
    MarkerBounded { start: String, end: String },

    /// After a start marker, a pattern captures threadmarks and word count
    PatternBounded { start: String, pattern: Regex },
}

impl ExtractionRule {
    /// Creates a marker-bounded rule
    pub fn marker_bounded(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::MarkerBounded {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a pattern-bounded rule from a custom pattern
    ///
    /// The pattern must have two capture groups: the threadmark descriptor
    /// and the word count.
    pub fn pattern_bounded(start: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::PatternBounded {
            start: start.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Creates a pattern-bounded rule using [`THREADMARK_PATTERN`]
    pub fn threadmark_summary(start: impl Into<String>) -> Self {
        Self::PatternBounded {
            start: start.into(),
            pattern: THREADMARK_REGEX.clone(),
        }
    }

    /// Extracts the word count from flattened page text
    ///
    /// Never fails: a missing marker or pattern yields [`Extraction::NotFound`].
    pub fn extract(&self, text: &str) -> Extraction {
        match self {
            Self::MarkerBounded { start, end } => extract_between(text, start, end),
            Self::PatternBounded { start, pattern } => extract_pattern(text, start, pattern),
        }
    }
}

fn extract_between(text: &str, start: &str, end: &str) -> Extraction {
    let Some(start_idx) = text.find(start) else {
        return Extraction::NotFound;
    };
    let rest = &text[start_idx + start.len()..];

    let Some(end_idx) = rest.find(end) else {
        return Extraction::NotFound;
    };

    let token = rest[..end_idx].trim();
    if token.is_empty() {
        return Extraction::NotFound;
    }

    if token.chars().count() < SUSPICIOUS_TOKEN_LEN {
        tracing::warn!(
            "Word count is less than {} characters: '{}'",
            SUSPICIOUS_TOKEN_LEN,
            token
        );
    }

    Extraction::Found(token.to_string())
}

fn extract_pattern(text: &str, start: &str, pattern: &Regex) -> Extraction {
    let Some(start_idx) = text.find(start) else {
        return Extraction::NotFound;
    };
    let rest = &text[start_idx + start.len()..];

    match pattern.captures(rest) {
        Some(caps) => {
            let threadmarks = caps.get(1).map_or("", |m| m.as_str());
            let words = caps.get(2).map_or("", |m| m.as_str());
            Extraction::Found(format!("{}, {}", threadmarks, words))
        }
        None => Extraction::NotFound,
    }
}
