use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::maintenance::{CacheFileKind, FilterCriteria};

#[derive(Parser, Debug)]
#[command(name = "ghcnd-cache")]
#[command(version)]
#[command(about = "Fetch and cache GHCN-Daily station catalogs and data files", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Cache directory (overrides configuration)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration and create the cache directory
    Init,
    /// Fetch resources through the cache
    Fetch(FetchArgs),
    /// Inspect or prune the cache directory
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URIs, station ids, aliases or catalog names (e.g. ghcnd-stations.txt)
    #[arg(required = true)]
    pub resources: Vec<String>,

    /// Freshness policy: always, never, yearly or a number of days
    #[arg(short, long)]
    pub policy: Option<String>,

    /// Bypass the cache and go straight to the archive
    #[arg(long)]
    pub no_cache: bool,

    /// Write content here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip resources whose origin is unavailable instead of stopping
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached files matching the filters
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Delete cached files matching the filters
    Remove {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Delete every data and catalog file in the cache
    Clean,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Two-letter country code (first two characters of the station id)
    #[arg(long)]
    pub country: Option<String>,

    /// State or province code from the station catalog
    #[arg(long)]
    pub region: Option<String>,

    /// Case-insensitive pattern matched against the station name
    #[arg(long)]
    pub location: Option<String>,

    /// Keep stations whose name does NOT match --location
    #[arg(long, requires = "location")]
    pub invert: bool,

    /// Only files larger than this many KB
    #[arg(long, value_name = "KB")]
    pub above: Option<u64>,

    /// Only files smaller than this many KB
    #[arg(long, value_name = "KB")]
    pub below: Option<u64>,

    /// Only files at least this many days old
    #[arg(long, value_name = "DAYS")]
    pub age: Option<i64>,

    /// Restrict to file types: active, discardable, catalog (repeatable)
    #[arg(long = "type", value_name = "TYPE")]
    pub kinds: Vec<CacheFileKind>,
}

impl FilterArgs {
    /// Build filter criteria; fails on an invalid location pattern
    pub fn to_criteria(&self) -> crate::utils::Result<FilterCriteria> {
        let mut criteria = FilterCriteria::default()
            .kinds(self.kinds.iter().copied())
            .invert(self.invert);

        if let Some(country) = &self.country {
            criteria = criteria.country(country.as_str());
        }
        if let Some(region) = &self.region {
            criteria = criteria.region(region.as_str());
        }
        if let Some(above) = self.above {
            criteria = criteria.above_kb(above);
        }
        if let Some(below) = self.below {
            criteria = criteria.below_kb(below);
        }
        if let Some(age) = self.age {
            criteria = criteria.min_age_days(age);
        }
        if let Some(pattern) = &self.location {
            criteria = criteria.location(pattern)?;
        }
        Ok(criteria)
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "ghcnd-cache",
            "fetch",
            "USC00011084",
            "ghcnd-stations.txt",
            "--policy",
            "always",
            "--keep-going",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.resources, vec!["USC00011084", "ghcnd-stations.txt"]);
                assert_eq!(args.policy.as_deref(), Some("always"));
                assert!(args.keep_going);
                assert!(!args.no_cache);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_filters() {
        let cli = Cli::try_parse_from([
            "ghcnd-cache",
            "-v",
            "cache",
            "report",
            "--country",
            "CA",
            "--below",
            "25",
            "--type",
            "discardable",
            "--type",
            "active",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Commands::Cache(CacheCommand::Report { filters, format }) = cli.command else {
            panic!("expected cache report");
        };
        assert!(matches!(format, OutputFormat::Json));
        assert_eq!(filters.kinds, vec![CacheFileKind::Discardable, CacheFileKind::Active]);

        let criteria = filters.to_criteria().unwrap();
        assert_eq!(criteria.country.as_deref(), Some("CA"));
        assert_eq!(criteria.below_kb, Some(25));
        assert_eq!(criteria.kinds.len(), 2);
        assert!(criteria.location.is_none());
    }

    #[test]
    fn test_invert_requires_location() {
        assert!(Cli::try_parse_from(["ghcnd-cache", "cache", "remove", "--invert"]).is_err());
        assert!(Cli::try_parse_from(["ghcnd-cache", "cache", "report", "--type", "bogus"]).is_err());
    }

    #[test]
    fn test_bad_location_pattern() {
        let filters = FilterArgs {
            location: Some("[".to_string()),
            ..FilterArgs::default()
        };
        assert!(filters.to_criteria().is_err());
    }
}
