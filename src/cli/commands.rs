use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{
    app::{init_config, Config},
    cache::{CachedFetcher, FetchSource, FreshnessPolicy},
    constants::COUNTRIES_CATALOG,
    maintenance::{self, CacheFileKind, CacheReport},
    origin::HttpOrigin,
    stations::CountryTable,
    utils::SystemClock,
};

use super::{CacheCommand, Commands, FetchArgs, FilterArgs, OutputFormat};

/// Handle CLI subcommands. Returns false when the command finished with
/// per-item failures.
pub async fn handle_command(command: &Commands, config: &Config, verbose: bool) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing ghcnd-cache...");
            init_config(config)?;
            Ok(true)
        }
        Commands::Fetch(args) => fetch(args, config, verbose).await,
        Commands::Cache(CacheCommand::Report { filters, format }) => {
            report(&require_cache_root(config)?, filters, config, format)?;
            Ok(true)
        }
        Commands::Cache(CacheCommand::Remove { filters }) => {
            remove(&require_cache_root(config)?, filters, config)
        }
        Commands::Cache(CacheCommand::Clean) => clean(&require_cache_root(config)?),
    }
}

fn require_cache_root(config: &Config) -> Result<PathBuf> {
    config
        .cache_root()
        .context("Caching is disabled in the configuration")
}

/// Fetch each resource and write its content out
async fn fetch(args: &FetchArgs, config: &Config, verbose: bool) -> Result<bool> {
    let directive = args
        .policy
        .as_deref()
        .unwrap_or(&config.cache.default_policy);
    let policy: FreshnessPolicy = directive.parse()?;

    let cache_root = if args.no_cache { None } else { config.cache_root() };
    let origin = HttpOrigin::new(config.origin.timeout(), &config.origin.user_agent)?;
    let fetcher = CachedFetcher::new(cache_root, origin);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    let mut all_ok = true;
    for resource in &args.resources {
        let uri = config.resolve(resource);
        let outcome = match fetcher.fetch(&uri, policy).await {
            Ok(outcome) => outcome,
            Err(e) if args.keep_going => {
                warn!("skipping {}: {}", resource, e);
                all_ok = false;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to fetch {}", uri)),
        };

        let source = match outcome.source {
            FetchSource::Cache => "cache".cyan(),
            FetchSource::Origin => "origin".green(),
        };
        match &outcome.content {
            Some(content) => {
                out.write_all(content)?;
                if verbose {
                    eprintln!("{} {} ({} bytes)", source, uri, content.len());
                }
            }
            None => {
                eprintln!("{} no data for {} (from {})", "[WARNING]".yellow(), resource, source);
                all_ok = false;
            }
        }
    }
    out.flush()?;

    if verbose {
        eprintln!("{}", fetcher.stats().format());
    }
    Ok(all_ok)
}

fn selected_report(root: &Path, filters: &FilterArgs, config: &Config) -> Result<(CacheReport, Vec<PathBuf>)> {
    let criteria = filters.to_criteria()?;
    let scan = maintenance::classify(root, &config.protected_ids(), &SystemClock)?;
    let included = maintenance::filter(scan.records, &criteria);
    Ok((CacheReport::new(included), scan.unrecognized))
}

/// Print the files matching `filters`
fn report(root: &Path, filters: &FilterArgs, config: &Config, format: &OutputFormat) -> Result<()> {
    let (report, unrecognized) = selected_report(root, filters, config)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let countries = load_countries(root);
    for record in &report.entries {
        let kind = match record.kind {
            CacheFileKind::Active => record.kind.to_string().green(),
            CacheFileKind::Discardable => record.kind.to_string().normal(),
            CacheFileKind::Catalog => record.kind.to_string().blue(),
        };
        let country = record
            .country
            .as_deref()
            .map(|code| countries.name(code).unwrap_or(code))
            .unwrap_or("");
        println!(
            "{:<12} {:<11} {:>8} KB {:>5}d  {:<2} {:<30} {}",
            record.id,
            kind,
            record.size_kb(),
            record.age_days,
            record.region.as_deref().unwrap_or(""),
            record.location.as_deref().unwrap_or(""),
            country,
        );
    }
    println!("{} files, {} KB total", report.len(), report.total_size_kb);

    if !unrecognized.is_empty() {
        println!("\nUnrecognized files:");
        for path in &unrecognized {
            println!("  {}", path.display());
        }
    }
    Ok(())
}

/// Delete the files matching `filters`
fn remove(root: &Path, filters: &FilterArgs, config: &Config) -> Result<bool> {
    let (report, _) = selected_report(root, filters, config)?;
    let errors = maintenance::remove(&report.entries);

    println!(
        "Removed {} of {} files ({} KB)",
        report.len() - errors.len(),
        report.len(),
        report.total_size_kb
    );
    print_errors(&errors);
    Ok(errors.is_empty())
}

/// Delete every recognized file in the cache
fn clean(root: &Path) -> Result<bool> {
    let errors = maintenance::clean(root)?;
    if errors.is_empty() {
        println!("Cache {} cleaned", root.display());
    }
    print_errors(&errors);
    Ok(errors.is_empty())
}

fn print_errors(errors: &[crate::utils::RemovalError]) {
    for error in errors {
        eprintln!("  {} {}", "[ERROR]".red(), error);
    }
}

fn load_countries(root: &Path) -> CountryTable {
    let path = root.join(COUNTRIES_CATALOG);
    if !path.is_file() {
        return CountryTable::default();
    }
    CountryTable::load(&path).unwrap_or_else(|e| {
        warn!("ignoring unreadable {}: {}", path.display(), e);
        CountryTable::default()
    })
}
