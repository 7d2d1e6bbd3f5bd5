//! CLI argument parsing and command definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Natural-language hotel search from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "staysift",
    author,
    version,
    about = "Natural-language hotel search from the terminal",
    propagate_version = true,
    after_help = "Use 'staysift <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,
    #[command(subcommand)]
    pub command: Command,
}

/// Global options available to all commands
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOpts {
    /// Output format (json, yaml, table, auto)
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        global = true,
        conflicts_with = "json"
    )]
    pub output_format: Option<OutputFormat>,

    /// Output as JSON (shorthand for -o json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Hotel listing server URL
    #[arg(short = 's', long, env = "STAYSIFT_SERVER", global = true)]
    pub server: Option<String>,

    /// Read the listing from a local JSON file instead of the server
    #[arg(long, value_name = "FILE", env = "STAYSIFT_HOTELS", global = true)]
    pub hotels: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Skip SSL certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Always fetch the listing, ignoring the on-disk cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Override config file path
    #[arg(long, value_name = "PATH", env = "STAYSIFT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Reduce output to only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase logging verbosity (stackable: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Enable trace logging
    #[arg(long, global = true)]
    pub trace: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Hide table headers
    #[arg(long, global = true)]
    pub no_headers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[non_exhaustive]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
    Auto,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search hotels with a free-text query (e.g. "piscina barato")
    Search(SearchArgs),

    /// Show how a query is interpreted, without searching
    Intent {
        /// Query words
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Autocomplete suggestions for a partial query
    Suggest {
        /// Partial query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// List all hotels
    List,

    /// Show one hotel in detail
    Show {
        /// Hotel slug or name (fuzzy match)
        hotel: String,
    },

    /// Recommend hotels by preferences
    Recommend(RecommendArgs),

    /// Manage the listing cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query words; empty lists every hotel
    pub query: Vec<String>,

    /// Only hotels with this star classification
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub stars: Option<u8>,

    /// Print the interpreted intent and search mode
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Accepted star classifications (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(1..=5))]
    pub stars: Vec<u8>,

    /// Lowest accepted rating
    #[arg(long, value_name = "RATING")]
    pub min_rating: Option<f64>,

    /// Important amenities, any of (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub amenities: Vec<String>,

    /// Ask the server's recommendation endpoint instead
    #[arg(long, conflicts_with_all = ["stars", "min_rating", "amenities"])]
    pub remote: bool,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show cache status
    Status,

    /// Fetch the listing again and cache it
    Refresh,

    /// Delete all cached data
    Clear,

    /// Print cache directory path
    Path,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration
    Show,

    /// Print config file path
    Path,

    /// Get a specific configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: Option<String>,
    },

    /// Reset configuration to defaults
    Reset,
}
