//! Output module for delimited record files
//!
//! This module handles:
//! - Writing threads as `name|url|word_count` lines
//! - Timestamped output file names
//! - The cleanup filter that keeps only well-formed record lines

mod cleanup;
mod delimited;

pub use cleanup::{
    clean_lines, cleanup_file, filter_records, is_record_line, verify_cleanup_paths, DEFAULT_CLEAN_OUTPUT,
};
pub use delimited::{timestamped_output_path, write_records, write_threads, OUTPUT_TIMESTAMP_FORMAT};

/// Field separator of the output format
pub const SEPARATOR: char = '|';

/// Removes characters that would break a record line
///
/// Newlines and carriage returns are dropped from every field; the separator
/// is dropped as well when `strip_separator` is set.
pub fn sanitize_field(field: &str, strip_separator: bool) -> String {
    field
        .chars()
        .filter(|&c| c != '\n' && c != '\r' && !(strip_separator && c == SEPARATOR))
        .collect()
}
