//! CLI command definitions and parsing
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::query::ReferenceScope;

#[derive(Parser, Debug)]
#[command(
    name = "sonar-query",
    version,
    author = "neur0map",
    about = "Build, inspect and run filter queries against a genomic sample browser backend",
    long_about = "sonar-query compiles nested AND/OR filter groups over sample metadata, mutation \
                  profiles, replicons and lineages into the backend's query-string protocol, runs \
                  them, and reshapes weekly statistics into gap-free series."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/sonar-query/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile to apply (e.g. "staging")
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the starting filter group of a fresh session as JSON
    InitFilter {
        /// Property of the initial date-range filter (defaults to the configured one)
        #[arg(long)]
        property: Option<String>,
    },

    /// Compile a filter group JSON file into andFilter/orFilter form
    Compile {
        /// Filter group JSON file, "-" for stdin. Date picks are
        /// `{"dates": [...]}` or an array of RFC 3339 timestamps
        file: PathBuf,

        /// Rewrite two-date filters to the range operator before compiling
        #[arg(long)]
        normalize: bool,
    },

    /// Encode a filter group as a backend query string
    QueryString {
        /// Filter group JSON file, "-" for stdin. Date picks are
        /// `{"dates": [...]}` or an array of RFC 3339 timestamps
        file: PathBuf,

        /// Page size
        #[arg(short, long)]
        limit: Option<u64>,

        /// Index of the first row
        #[arg(short, long)]
        offset: Option<u64>,

        /// Reference accession to scope to (overrides config)
        #[arg(short, long)]
        reference: Option<String>,

        /// How the reference scope is attached
        #[arg(long, value_enum)]
        reference_mode: Option<ReferenceMode>,

        /// Data set to scope to; repeatable (overrides config)
        #[arg(short = 'd', long = "data-set")]
        data_sets: Vec<String>,
    },

    /// Decode a query string back into its filter payload
    Decode {
        /// Query string, with or without the leading '?'
        query: String,
    },

    /// Normalize one or two dates into an inclusive calendar-date range
    Dates {
        /// Dates as YYYY-MM-DD or RFC 3339
        #[arg(required = true, num_args = 1..=2)]
        dates: Vec<String>,
    },

    /// List every ISO week between two week labels, inclusive
    Weeks {
        /// First week, e.g. 2024-W01
        start: String,

        /// Last week, e.g. 2024-W10
        end: String,
    },

    /// Run a request against the backend
    Fetch {
        /// What to fetch
        #[arg(value_enum)]
        endpoint: FetchEndpoint,

        /// Filter group JSON file (defaults to the initial filter group)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Property for custom plots and value options
        #[arg(long)]
        property: Option<String>,

        /// Zero-based page of the sample list
        #[arg(long, default_value = "0")]
        page: u64,

        /// Export columns besides "name"; repeatable
        #[arg(long = "column")]
        columns: Vec<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceMode {
    /// Prepend a Reference filter record
    Filter,
    /// Send a top-level reference_accession parameter
    Root,
}

impl From<ReferenceMode> for ReferenceScope {
    fn from(mode: ReferenceMode) -> Self {
        match mode {
            ReferenceMode::Filter => ReferenceScope::Filter,
            ReferenceMode::Root => ReferenceScope::RootParameter,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchEndpoint {
    /// One page of samples
    Samples,
    /// Database-wide statistics
    Statistics,
    /// Count of samples matching the filters
    FilteredStatistics,
    /// Gap-filled weekly sample counts
    SamplesPerWeek,
    /// Gap-filled lineage group shares per week
    GroupedLineages,
    /// Metadata coverage rows
    Coverage,
    /// Sample counts per value of --property
    Custom,
    /// Distinct values of --property
    PropertyValues,
    /// Property definitions
    Properties,
    Lineages,
    Accessions,
    GeneSymbols,
    /// Print the CSV export URL without downloading
    ExportUrl,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
