//! Command-line interface for relcat.
//!
//! ```text
//! # Products known to the releases site
//! relcat list
//!
//! # Versions of one product, ascending
//! relcat versions terraform
//!
//! # Install the latest terraform for this machine into ./bin
//! relcat install terraform --dir bin
//!
//! # Per-product shortcut
//! relcat terraform latest
//!
//! # Build the catalog by crawling listings instead of the index document
//! relcat --crawl --parallelism 20 list
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod install;
pub mod query;
pub mod verify;

#[derive(Debug, Parser)]
#[command(name = "relcat", version, propagate_version = true)]
#[command(about = "Browse, verify and install vendor software releases")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Crawl directory listings instead of reading the index document
    #[arg(long, global = true)]
    pub crawl: bool,

    /// Simultaneous page fetches while crawling
    #[arg(long, global = true)]
    pub parallelism: Option<usize>,

    /// Releases site
    #[arg(long, global = true, env = "RELCAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Where fetched index documents are cached
    #[arg(long, global = true, env = "RELCAT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, global = true, env = "RELCAT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List known products
    #[command(alias = "ls")]
    List,

    /// Print the latest version of a product
    Latest { product: String },

    /// List the versions of a product, oldest first
    Versions { product: String },

    /// Download, verify and install a product's executable
    #[command(alias = "i")]
    Install(InstallArgs),

    /// Download and verify a release archive without extracting it
    Fetch(InstallArgs),

    /// Check a downloaded artifact against its published checksums
    Verify { file: PathBuf },

    /// `relcat <product> [list|latest|install]`
    #[command(external_subcommand)]
    Product(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct InstallArgs {
    pub product: String,

    /// Version to install; latest when omitted
    #[arg(id = "version_spec", value_name = "VERSION")]
    pub version: Option<String>,

    /// Target operating system; this machine's when omitted
    #[arg(long)]
    pub os: Option<String>,

    /// Target architecture; this machine's when omitted
    #[arg(long)]
    pub arch: Option<String>,

    /// Destination directory
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
}

/// A resolved request, from a subcommand or a product shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    List,
    Versions { product: String },
    Latest { product: String },
    Install(InstallArgs),
    Fetch(InstallArgs),
}
