//! Post-hoc filter for delimited output files
//!
//! Lines worth keeping look like:
//!
//! ```text
//! The Gardener's Tale (Star Wars SI)|https://forums.spacebattles.com/threads/the-gardeners-tale-star-wars-si.854323/| 1,000,000+
//! Blind as a Beetle (Naruto SI)|https://forums.sufficientvelocity.com/threads/blind-as-a-beetle-naruto-si.52565/|8 threadmarks, 24k
//! ```
//!
//! Blank lines, lines without a URL field, and error banners caught in a name
//! field are dropped.

use crate::{CensusError, Result};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

/// Output path used when none is given
pub const DEFAULT_CLEAN_OUTPUT: &str = "output-clean.csv";

/// A non-empty field, a separator, then an HTTP(S) URL
static RECORD_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+?\|https?://.+?").expect("hardcoded record pattern is valid"));

/// Returns true if a line looks like an output record
pub fn is_record_line(line: &str) -> bool {
    RECORD_LINE_REGEX.is_match(line)
}

/// Checks the paths before cleaning
///
/// Refuses a missing input file, and an existing output file unless `force`
/// is set.
pub fn verify_cleanup_paths(input: &Path, output: &Path, force: bool) -> Result<()> {
    if !input.is_file() {
        return Err(CensusError::Cleanup(format!(
            "input file does not exist: {}",
            input.display()
        )));
    }

    if output.is_file() && !force {
        return Err(CensusError::Cleanup(format!(
            "output file {} exists and force not set",
            output.display()
        )));
    }

    Ok(())
}

/// Reads every line of `reader` and keeps the record lines, trimmed
///
/// Lines that are not valid UTF-8 are dropped with a warning.
pub fn filter_records<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut kept = Vec::new();

    for (number, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let Ok(line) = String::from_utf8(line) else {
            tracing::warn!("Dropping line {}: not valid UTF-8", number + 1);
            continue;
        };

        if is_record_line(&line) {
            kept.push(line.trim().to_string());
        }
    }

    Ok(kept)
}

/// Copies record lines from `reader` to `writer`, trimmed
///
/// # Returns
///
/// The number of lines kept
pub fn clean_lines<R: BufRead, W: Write>(reader: R, writer: W) -> Result<usize> {
    let records = filter_records(reader)?;
    write_lines(writer, &records)?;
    Ok(records.len())
}

fn write_lines<W: Write>(mut writer: W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Filters an output file into a clean copy
///
/// The whole input is read before the output file is created, so a failed
/// read never leaves a partial output behind.
///
/// # Arguments
///
/// * `input` - The file to read from
/// * `output` - The file to write to
/// * `force` - Overwrite `output` if it exists
///
/// # Returns
///
/// * `Ok(usize)` - Number of lines kept
/// * `Err(CensusError)` - The paths were refused or a read/write failed
pub fn cleanup_file(input: &Path, output: &Path, force: bool) -> Result<usize> {
    verify_cleanup_paths(input, output, force)?;

    let records = filter_records(BufReader::new(File::open(input)?))?;
    write_lines(BufWriter::new(File::create(output)?), &records)?;

    tracing::info!(
        "Output cleaned up and written to {} ({} lines kept)",
        output.display(),
        records.len()
    );
    Ok(records.len())
}
