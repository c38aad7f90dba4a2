use crate::site::extract::{Extraction, ExtractionRule};
use std::fmt;
use std::time::Duration;

/// Error banner both forums render when a request goes wrong server-side
pub const DEFAULT_ERROR_TEXT: &str = "Oops! We ran into some problems.";

/// How long to wait before retrying after HTTP 429
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(5);

/// Number of characters of page text kept on either side of an error marker
const ERROR_EXCERPT_RADIUS: usize = 120;

/// The forums this crate knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    SufficientVelocity,
    QuestionableQuesting,
}

impl SiteKind {
    /// Short prefix used for output file names (`sv-output-...`)
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::SufficientVelocity => "sv",
            Self::QuestionableQuesting => "qq",
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SufficientVelocity => f.write_str("Sufficient Velocity"),
            Self::QuestionableQuesting => f.write_str("Questionable Questing"),
        }
    }
}

/// Per-site constants and the word-count extraction rule
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Which forum this profile describes
    pub kind: SiteKind,

    /// URL of the archive thread whose pages list the stories
    pub base_url: String,

    /// Threadmark page template; `{}` is replaced with the thread URL
    pub url_pattern: String,

    /// How the word count is located in the threadmark page text
    pub rule: ExtractionRule,

    /// Text whose presence means the forum rendered an error page
    pub error_text: String,

    /// Wait applied after each HTTP 429 before retrying
    pub rate_limit_cooldown: Duration,
}

impl SiteProfile {
    /// Sufficient Velocity: `Statistics (<n> threadmarks, <count> words)`
    pub fn sufficient_velocity() -> Self {
        Self {
            kind: SiteKind::SufficientVelocity,
            base_url: "https://forums.sufficientvelocity.com/threads/sufficiently-inserted-sv-self-insert-archive-v2-0.41389".to_string(),
            url_pattern: "{}/threadmarks".to_string(),
            rule: ExtractionRule::marker_bounded("Statistics (", "words"),
            error_text: DEFAULT_ERROR_TEXT.to_string(),
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
        }
    }

    /// Questionable Questing: `Statistics <n> threadmarks, Word Count: <count>`
    pub fn questionable_questing() -> Self {
        Self {
            kind: SiteKind::QuestionableQuesting,
            base_url: "https://forum.questionablequesting.com/threads/questing-for-insertion-qq-self-insert-archive.1094".to_string(),
            url_pattern: "{}/threadmarks?category_id=1".to_string(),
            rule: ExtractionRule::threadmark_summary("Statistics"),
            error_text: DEFAULT_ERROR_TEXT.to_string(),
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
        }
    }

    /// Returns the built-in profile for a site
    pub fn builtin(kind: SiteKind) -> Self {
        match kind {
            SiteKind::SufficientVelocity => Self::sufficient_velocity(),
            SiteKind::QuestionableQuesting => Self::questionable_questing(),
        }
    }

    /// Builds the threadmark page URL for a thread
    pub fn stats_url(&self, thread_url: &str) -> String {
        self.url_pattern
            .replacen("{}", thread_url.trim_end_matches('/'), 1)
    }

    /// Extracts the word count from flattened threadmark page text
    pub fn extract_word_count(&self, text: &str) -> Extraction {
        self.rule.extract(text)
    }

    /// Returns the text around the error marker if the page reports an error
    pub fn error_excerpt(&self, text: &str) -> Option<String> {
        if self.error_text.is_empty() {
            return None;
        }

        let idx = text.find(&self.error_text)?;
        let start = floor_char_boundary(text, idx.saturating_sub(ERROR_EXCERPT_RADIUS));
        let end = ceil_char_boundary(
            text,
            (idx + self.error_text.len() + ERROR_EXCERPT_RADIUS).min(text.len()),
        );
        Some(text[start..end].trim().to_string())
    }
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
