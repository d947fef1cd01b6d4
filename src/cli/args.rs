//! CLI argument parsing

use crate::ScanOptions;
use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nCommit: ",
    env!("GIT_HASH"),
    " (",
    env!("GIT_DATE"),
    ")\nTarget: ",
    env!("BUILD_TARGET"),
);

/// Manage a collection of CD, DVD and Blu-ray discs.
///
/// Scanned discs are recorded with their full directory tree so the
/// collection can be listed and searched without the media at hand. Modes
/// may be combined and run in the order add, brief, list, search, remove.
#[derive(Debug, Clone, Parser)]
#[command(name = "discgatherer", version, long_version = LONG_VERSION)]
pub struct CliArgs {
    /// Scan the disc in the drive and add it to the collection
    #[arg(short = 'a', long)]
    pub add: bool,

    /// Record this label instead of the one detected on the disc
    #[arg(short = 'L', long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Briefly list all discs (IDs and labels)
    #[arg(short = 'b', long)]
    pub brief: bool,

    /// List all discs with every folder and file
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Remove the disc stored under this ID
    #[arg(short = 'r', long, value_name = "ID")]
    pub remove: Option<String>,

    /// Search for case-insensitive words; quote multiple words
    #[arg(short = 's', long, value_name = "WORDS")]
    pub search: Option<String>,

    /// Match search words against whole name tokens only
    #[arg(short = 'S', long)]
    pub strict: bool,

    /// Print sizes, timestamps and scan details
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Emit brief, list and search results as JSON
    #[arg(long)]
    pub json: bool,

    /// Catalog file
    #[arg(long, value_name = "FILE", env = "DISCGATHERER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Optical drive device node
    #[arg(long, value_name = "DEVICE", env = "DISCGATHERER_DEVICE")]
    pub device: Option<PathBuf>,

    /// Directory holding per-user media mount points
    #[arg(long, value_name = "DIR", env = "DISCGATHERER_MOUNT_ROOT")]
    pub mount_root: Option<PathBuf>,

    /// Read disc content from this directory instead of resolving the mount point
    #[arg(long, value_name = "DIR", env = "DISCGATHERER_MOUNT_PATH")]
    pub mount_path: Option<PathBuf>,
}

impl CliArgs {
    /// Whether any mode was requested
    #[must_use]
    pub fn has_mode(&self) -> bool {
        self.add || self.brief || self.list || self.search.is_some() || self.remove.is_some()
    }

    /// Merge command-line and environment overrides over the defaults.
    #[must_use]
    pub fn config(&self) -> Config {
        let defaults = Config::default();
        Config {
            catalog_path: self.catalog.clone().unwrap_or(defaults.catalog_path),
            device: self.device.clone().unwrap_or(defaults.device),
            mount_root: self.mount_root.clone().unwrap_or(defaults.mount_root),
            mount_path: self.mount_path.clone().or(defaults.mount_path),
        }
    }

    #[must_use]
    pub fn scan_options(&self, config: &Config) -> ScanOptions {
        ScanOptions {
            label: self.label.clone(),
            mount_root: config.mount_root.clone(),
            mount_path: config.mount_path.clone(),
            user: None,
        }
    }
}

/// Parse command line arguments
pub fn parse_args<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(args)
}
