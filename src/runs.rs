//! Site entry points
//!
//! Each run is independent: it builds its own coordinator, enumerates the
//! site's index pages, retrieves word counts and writes its own output file.
//! AO3 is handled by an external scraper invoked as a subprocess.

use crate::config::{Ao3Config, Config};
use crate::crawler::{Coordinator, CrawlReport, Thread};
use crate::output::{timestamped_output_path, write_threads};
use crate::site::SiteKind;
use crate::storage::{SnapshotStore, SqliteStorage};
use crate::{CensusError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;

/// What a site run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Site that was crawled
    pub site: SiteKind,

    /// Delimited output file
    pub output_path: PathBuf,

    /// Snapshot database, if one was written
    pub snapshot_path: Option<PathBuf>,

    /// Word-count pass outcome
    pub report: CrawlReport,
}

/// Path of a site's snapshot database (`sv-threads.db`)
pub fn snapshot_path(dir: &Path, site: SiteKind) -> PathBuf {
    dir.join(format!("{}-threads.db", site.file_prefix()))
}

/// Crawls one site end to end
///
/// The output directory is created before any request is made, so an
/// unusable path fails the run up front. Index pages are enumerated in order,
/// each appended to the previous ones. An enumeration failure aborts the run
/// before any output is written. Once enumeration succeeds, output is always
/// written, however many threads failed.
pub async fn run_site(config: &Config, site: SiteKind) -> Result<RunSummary> {
    let resolved = config.site(site).resolve(site)?;
    let output_dir = &config.crawler.output_dir;

    tracing::info!("== {} ==", site);

    std::fs::create_dir_all(output_dir)?;

    let mut coordinator = Coordinator::from_config(config, resolved.profile.clone())?;

    let mut threads: Vec<Thread> = Vec::new();
    for page in &resolved.pages {
        let url = resolved.page_url(page);
        threads = coordinator
            .enumerate(&url, &page.start, &page.end, threads)
            .await?;
    }

    tracing::info!("Found {} threads", threads.len());
    tracing::info!("Retrieving word counts...");

    let report = coordinator.retrieve_word_counts(&mut threads).await;

    let snapshot_path = if resolved.snapshot {
        let path = snapshot_path(output_dir, site);
        match write_snapshot(&path, site, &threads) {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::error!("Failed to write snapshot {}: {}", path.display(), e);
                None
            }
        }
    } else {
        None
    };

    let output_path = timestamped_output_path(output_dir, site.file_prefix(), &Local::now());
    write_threads(&output_path, &threads)?;

    Ok(RunSummary {
        site,
        output_path,
        snapshot_path,
        report,
    })
}

fn write_snapshot(path: &Path, site: SiteKind, threads: &[Thread]) -> Result<()> {
    let mut storage = SqliteStorage::new(path)?;
    let id = storage.save_snapshot(site.file_prefix(), threads)?;
    tracing::info!("Saved snapshot {} to {}", id, path.display());
    Ok(())
}

/// Re-exports the latest snapshot in a database as delimited output
///
/// # Returns
///
/// * `Ok(usize)` - Number of threads written
/// * `Err(CensusError)` - The database was empty or could not be read
pub fn export_snapshot(database: &Path, output: &Path) -> Result<usize> {
    let storage = SqliteStorage::new(database)?;
    let snapshot = storage
        .latest_snapshot()?
        .ok_or(crate::storage::StorageError::Empty)?;

    tracing::info!(
        "Exporting snapshot {} ({}, taken {})",
        snapshot.id,
        snapshot.site,
        snapshot.taken_at
    );

    write_threads(output, &snapshot.threads)?;
    Ok(snapshot.threads.len())
}

/// Builds the AO3Scraper command line
///
/// Returns the program and its arguments.
pub fn ao3_command_args(config: &Ao3Config, output_dir: &Path, start_page: u32) -> (String, Vec<String>) {
    let out_csv = output_dir.join(format!(
        "ao3-output-{}",
        Local::now().format(crate::output::OUTPUT_TIMESTAMP_FORMAT)
    ));

    (
        config.python.clone(),
        vec![
            config.script.display().to_string(),
            config.tag_url.clone(),
            "--start_page".to_string(),
            start_page.to_string(),
            format!("--out_csv={}", out_csv.display()),
        ],
    )
}

/// Runs the AO3Scraper work-id collector
///
/// # Returns
///
/// * `Ok(ExitStatus)` - The scraper ran (its own status is returned as-is)
/// * `Err(CensusError)` - The process could not be started
pub async fn run_ao3(config: &Ao3Config, output_dir: &Path, start_page: u32) -> Result<ExitStatus> {
    tracing::info!("== Archive of Our Own ==");

    let (program, args) = ao3_command_args(config, output_dir, start_page);
    tracing::debug!("Running {} {:?}", program, args);

    let status = Command::new(&program)
        .args(&args)
        .status()
        .await
        .map_err(|e| CensusError::Subprocess(format!("failed to start {}: {}", program, e)))?;

    if status.success() {
        tracing::info!("AO3 scraper finished: {}", status);
    } else {
        tracing::warn!("AO3 scraper exited with {}", status);
    }

    Ok(status)
}
