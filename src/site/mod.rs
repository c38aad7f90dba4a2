//! Site profiles and word-count extraction
//!
//! Each forum renders its threadmark statistics differently once the markup is
//! stripped away. A [`SiteProfile`] bundles the constants for one forum together
//! with the [`ExtractionRule`] that pulls the word count out of the page text.

mod extract;
mod profile;

pub use extract::{Extraction, ExtractionRule, THREADMARK_PATTERN, WORD_COUNT_NOT_FOUND};
pub use profile::{SiteKind, SiteProfile, DEFAULT_ERROR_TEXT, DEFAULT_RATE_LIMIT_COOLDOWN};
