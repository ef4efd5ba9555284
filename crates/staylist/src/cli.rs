//! Clap derive structures for the `staylist` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Only
//! clap is used here so `build.rs` can include this file for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// staylist -- browse a travel catalog and keep track of favorites
#[derive(Debug, Parser)]
#[command(
    name = "staylist",
    version,
    about = "Browse a travel catalog and manage favorites from the command line",
    long_about = "Browse stays, exclusive experiences, photographers and chefs served by a\n\
        catalog store, search and filter them, and mark favorites.\n\n\
        Favorite changes are applied immediately and rolled back if the store\n\
        rejects them or does not answer in time.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Catalog store URL (overrides config)
    #[arg(long, short = 'u', env = "STAYLIST_URL", global = true)]
    pub url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, env = "STAYLIST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STAYLIST_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "STAYLIST_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "STAYLIST_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Seconds a favorite change may take before it is rolled back
    #[arg(long, env = "STAYLIST_WRITE_TIMEOUT", global = true)]
    pub write_timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Catalog enums ────────────────────────────────────────────────────

/// Catalog section to browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Places to stay
    #[value(alias = "stays")]
    Accommodations,
    /// Exclusive experiences
    #[value(alias = "experiences")]
    Exclusives,
    /// Photographers
    Photography,
    /// Private chefs
    Chefs,
    /// Popular experiences
    Popular,
}

/// Record field with a finite set of values worth listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldArg {
    City,
    Location,
    Type,
    Category,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a catalog section with search, filters and pagination
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one record in full
    Show(ShowArgs),

    /// Flip the favorite flag on one or more records
    #[command(alias = "fav")]
    Toggle(ToggleArgs),

    /// List every favorited record across all sections
    Favorites(FavoritesArgs),

    /// Print the total favorite count whenever it changes
    WatchFavorites(WatchArgs),

    /// List the distinct values of a field, for building filters
    Facets(FacetsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Catalog section
    pub kind: KindArg,

    /// Free-text search over title, location, city, category, type and price
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter as KEY=VALUE (minPrice, maxPrice, minRating, city, type,
    /// category, location). Repeatable.
    #[arg(long = "filter", short = 'f', value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Page to show (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: usize,

    /// Show every matching record instead of one page
    #[arg(long, short = 'a', conflicts_with = "page")]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Catalog section
    pub kind: KindArg,

    /// Record id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Catalog section
    pub kind: KindArg,

    /// Record ids; each one is flipped independently
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct FavoritesArgs {
    /// Only show favorites from this section
    #[arg(long)]
    pub kind: Option<KindArg>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling interval in seconds (overrides config)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Exit after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct FacetsArgs {
    /// Catalog section
    pub kind: KindArg,

    /// Only list values for this field
    #[arg(long, short = 'F')]
    pub field: Option<FieldArg>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default settings
    Init {
        /// Store URL to write instead of the default
        #[arg(long)]
        store_url: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration (file + environment)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
