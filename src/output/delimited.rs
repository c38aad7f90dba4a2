//! `|`-delimited record output

use crate::crawler::Thread;
use crate::output::{sanitize_field, SEPARATOR};
use crate::Result;
use chrono::{DateTime, TimeZone};
use csv::{QuoteStyle, WriterBuilder};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp embedded in output file names
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Builds `<dir>/<prefix>-output-<timestamp>.csv`
pub fn timestamped_output_path<Tz>(dir: &Path, prefix: &str, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dir.join(format!(
        "{}-output-{}.csv",
        prefix,
        now.format(OUTPUT_TIMESTAMP_FORMAT)
    ))
}

fn record_fields(thread: &Thread) -> [String; 3] {
    [
        sanitize_field(&thread.name, true),
        sanitize_field(&thread.url, false),
        sanitize_field(&thread.word_count, false),
    ]
}

/// Writes threads to `writer`, one record per line, no header
pub fn write_records<W: Write>(writer: W, threads: &[Thread]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(SEPARATOR as u8)
        .quote_style(QuoteStyle::Never)
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    for thread in threads {
        wtr.write_record(record_fields(thread))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes threads to a file at `path`, creating or truncating it
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote all records
/// * `Err(CensusError)` - The file could not be written
pub fn write_threads(path: &Path, threads: &[Thread]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_records(file, threads)?;
    tracing::info!("Wrote {} records to {}", threads.len(), path.display());
    Ok(())
}
