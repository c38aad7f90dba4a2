//! SI-Census main entry point
//!
//! This is the command-line interface for the SI-Census word-count crawler.

use clap::{Args, Parser, Subcommand};
use si_census::config::{load_config_with_hash, Config};
use si_census::output::{cleanup_file, DEFAULT_CLEAN_OUTPUT};
use si_census::runs::{export_snapshot, run_ao3, run_site};
use si_census::site::SiteKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SI-Census: word counts for self-insert story archives
///
/// Walks the self-insert archive threads on Sufficient Velocity and
/// Questionable Questing, looks up each story's word count on its threadmark
/// page, and writes `name|url|word_count` records.
#[derive(Parser, Debug)]
#[command(name = "si-census")]
#[command(version)]
#[command(about = "Scrape word counts from SI fanfics on various sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory for output files, overrides the configuration
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one or more sites and write delimited output
    Crawl(CrawlArgs),

    /// Keep only well-formed record lines of an output file
    Clean(CleanArgs),

    /// Write the latest snapshot in a database as delimited output
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Scrape word counts from Sufficient Velocity
    #[arg(long, visible_alias = "sv")]
    sufficient_velocity: bool,

    /// Scrape word counts from Questionable Questing
    #[arg(long, visible_alias = "qq")]
    questionable_questing: bool,

    /// Collect work ids from Archive of Our Own (runs AO3Scraper)
    #[arg(long, visible_alias = "ao3")]
    archive_of_our_own: bool,

    /// Start page for AO3 scraping
    #[arg(long, default_value_t = 1)]
    start_page: u32,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// The file to read from
    input_file: PathBuf,

    /// The file to write to
    #[arg(short, long, default_value = DEFAULT_CLEAN_OUTPUT)]
    output_file: PathBuf,

    /// Force overwrite of output_file
    #[arg(short, long)]
    force: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Snapshot database (e.g. sv-threads.db)
    snapshot: PathBuf,

    /// The file to write to
    #[arg(short, long)]
    output_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => {
            let config = load(cli.config, cli.output_dir)?;
            if args.dry_run {
                handle_dry_run(&config, &args)?;
            } else {
                handle_crawl(&config, &args).await?;
            }
        }
        Command::Clean(args) => {
            tracing::info!("Cleanup SI output");
            let kept = cleanup_file(&args.input_file, &args.output_file, args.force)?;
            println!(
                "Output cleaned up and written to {} ({} lines)",
                args.output_file.display(),
                kept
            );
        }
        Command::Export(args) => {
            let count = export_snapshot(&args.snapshot, &args.output_file)?;
            println!(
                "✓ Exported {} threads to {}",
                count,
                args.output_file.display()
            );
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("si_census=info,warn"),
            1 => EnvFilter::new("si_census=debug,info"),
            2 => EnvFilter::new("si_census=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the built-in defaults
fn load(path: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(&path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::debug!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(dir) = output_dir {
        config.crawler.output_dir = dir;
    }

    Ok(config)
}

fn selected_sites(args: &CrawlArgs) -> Vec<SiteKind> {
    let mut sites = Vec::new();
    if args.sufficient_velocity {
        sites.push(SiteKind::SufficientVelocity);
    }
    if args.questionable_questing {
        sites.push(SiteKind::QuestionableQuesting);
    }
    sites
}

/// Handles --dry-run: shows what would be crawled
fn handle_dry_run(config: &Config, args: &CrawlArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SI-Census Dry Run ===\n");
    println!("Output directory: {}", config.crawler.output_dir.display());
    println!(
        "Timeouts: request {}s, connect {}s",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    match config.crawler.max_throttle_retries {
        Some(max) => println!("Throttle retries per thread: {}", max),
        None => println!("Throttle retries per thread: unbounded"),
    }

    for site in selected_sites(args) {
        let resolved = config.site(site).resolve(site)?;
        println!("\n{}:", site);
        println!("  Threadmark pages: {}", resolved.profile.url_pattern);
        println!(
            "  Cooldown after 429: {}s",
            resolved.profile.rate_limit_cooldown.as_secs()
        );
        println!("  Snapshot: {}", resolved.snapshot);
        for page in &resolved.pages {
            println!("  - {}", resolved.page_url(page));
            println!("    from after '{}' through '{}'", page.start, page.end);
        }
    }

    if args.archive_of_our_own {
        println!("\nArchive of Our Own:");
        println!(
            "  {} {} (start page {})",
            config.ao3.python,
            config.ao3.script.display(),
            args.start_page
        );
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the crawl runs, one site after another
async fn handle_crawl(config: &Config, args: &CrawlArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sites = selected_sites(args);
    if sites.is_empty() && !args.archive_of_our_own {
        tracing::warn!("No site selected; pass --sv, --qq or --ao3");
    }

    for site in sites {
        match run_site(config, site).await {
            Ok(summary) => {
                tracing::info!(
                    "{}: {} threads, {} failed, written to {}",
                    site,
                    summary.report.total,
                    summary.report.failures.len(),
                    summary.output_path.display()
                );
            }
            Err(e) => {
                tracing::error!("{} crawl failed: {}", site, e);
                return Err(e.into());
            }
        }
    }

    if args.archive_of_our_own {
        run_ao3(&config.ao3, &config.crawler.output_dir, args.start_page).await?;
    }

    println!("Done!");
    Ok(())
}
