mod enrich;
mod extractor;
mod fetcher;
mod parser;
mod settings;
mod store;
mod utils;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use enrich::{EnrichStats, LogoDir};
use fetcher::Fetcher;
use settings::Settings;
use utils::{format_duration, truncate};

#[derive(Parser)]
#[command(name = "logo_harvest", about = "Client logo extraction for the portfolio site")]
struct Cli {
    /// Settings file (default: ./logo_harvest.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan scrape snapshots and write the logo mapping
    Extract,
    /// Download mapped logos and update the portfolio data
    Download,
    /// Extract + download in one go
    Run,
    /// Download hand-picked logos from the manual list
    Manual,
    /// Download a single image into the logo directory
    Fetch {
        /// Image URL
        url: String,
        /// File name inside the logo directory
        filename: String,
    },
    /// Portfolio entries and their logos
    Overview {
        /// Only entries without a logo
        #[arg(long, conflicts_with = "with_logo")]
        missing: bool,
        /// Only entries with a logo
        #[arg(long)]
        with_logo: bool,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Extract => run_extract(&settings),
        Commands::Download => run_download(&settings).await,
        Commands::Run => {
            run_extract(&settings)?;
            run_download(&settings).await
        }
        Commands::Manual => {
            let manual = store::load_manual_logos(&settings.manual_logos_file)?;
            if manual.is_empty() {
                println!("No manual logos listed in {}.", settings.manual_logos_file.display());
                return Ok(());
            }
            let mut portfolio = store::load_portfolio(&settings.portfolio_file)?;
            let fetcher = Fetcher::new(&settings.fetch)?;
            let target = LogoDir::from_settings(&settings);

            let stats = enrich::apply_manual_logos(&fetcher, &target, &manual, &mut portfolio).await?;
            store::save_portfolio(&settings.portfolio_file, &portfolio)?;
            print_enrich(&stats);
            println!("Portfolio data updated with manual entries.");
            Ok(())
        }
        Commands::Fetch { url, filename } => {
            let target = LogoDir::from_settings(&settings);
            target.ensure()?;
            let dest = target.dir.join(&filename);
            let fetcher = Fetcher::new(&settings.fetch)?;

            println!("Downloading {} to {}...", url, dest.display());
            let bytes = fetcher
                .download(&url, &dest)
                .await
                .with_context(|| format!("Download failed: {}", url))?;
            println!("Download complete ({} bytes).", bytes);
            Ok(())
        }
        Commands::Overview { missing, with_logo, limit } => {
            let portfolio = store::load_portfolio(&settings.portfolio_file)?;
            let rows: Vec<_> = portfolio
                .iter()
                .filter(|p| !missing || p.logo.is_none())
                .filter(|p| !with_logo || p.logo.is_some())
                .take(limit)
                .collect();
            if rows.is_empty() {
                println!("No portfolio entries.");
                return Ok(());
            }

            println!("{:>3} | {:<24} | {:<36} | {:<32}", "#", "Project", "URL", "Logo");
            println!("{}", "-".repeat(104));

            for (i, p) in rows.iter().enumerate() {
                let logo = p.logo.as_deref().unwrap_or("-");
                println!(
                    "{:>3} | {:<24} | {:<36} | {:<32}",
                    i + 1,
                    truncate(&p.title, 24),
                    truncate(&p.url, 36),
                    truncate(logo, 32),
                );
            }

            let with = portfolio.iter().filter(|p| p.logo.is_some()).count();
            println!("\n{} shown | {}/{} entries have a logo", rows.len(), with, portfolio.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_extract(settings: &Settings) -> anyhow::Result<()> {
    let paths = store::load_scrape_paths(&settings.scrape_paths)?;
    println!("Extracting logos from {} snapshots...", paths.len());

    let (logos, stats) = extractor::extract_logos(&paths);
    store::save_logo_map(&settings.logos_file, &logos)?;

    println!(
        "Done: {} snapshots ({} with logo, {} without, {} errors) -> {}",
        stats.total,
        stats.found,
        stats.missing,
        stats.errors,
        settings.logos_file.display()
    );
    Ok(())
}

async fn run_download(settings: &Settings) -> anyhow::Result<()> {
    let logos = store::load_logo_map(&settings.logos_file)?;
    let mut portfolio = store::load_portfolio(&settings.portfolio_file)?;
    if portfolio.is_empty() {
        println!("Portfolio is empty, nothing to do.");
        return Ok(());
    }

    let fetcher = Fetcher::new(&settings.fetch)?;
    let target = LogoDir::from_settings(settings);

    println!("Downloading logos for {} projects...", portfolio.len());
    let stats = enrich::download_logos(&fetcher, &target, &logos, &mut portfolio).await?;
    store::save_portfolio(&settings.portfolio_file, &portfolio)?;

    print_enrich(&stats);
    println!("Portfolio data updated.");
    Ok(())
}

fn print_enrich(stats: &EnrichStats) {
    println!(
        "Done: {} total ({} downloaded, {} skipped, {} failed).",
        stats.total, stats.downloaded, stats.skipped, stats.failed
    );
}
