//! Optical Disc Catalog Library
//!
//! This library records the directory tree of optical discs into a persistent
//! catalog, so the collection can be listed, searched, and pruned without
//! the physical media at hand. Catalogs are persisted in Parquet format.

pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod services;

pub use models::{DeviceProperties, Disc, DiscId, Entry, EntryKind, Timestamps, Tree};

use services::device::{self, DeviceInspector};
use std::path::{Path, PathBuf};
use std::result;

/// Custom error type for the library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("There seems to be no drive present at {}", device.display())]
    NoDevice { device: PathBuf },
    #[error("There seems to be no disc present in {}", device.display())]
    NoMedium { device: PathBuf },
    #[error("There is no such disc ID in your collection: {0}")]
    NotFound(DiscId),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Device inspection failed: {0}")]
    Inspection(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code reported for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NoDevice { .. } | Error::NoMedium { .. } | Error::NotFound(_) => 1,
            Error::InvalidInput(_) => 2,
            Error::Inspection(_) | Error::Io(_) => 4,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Options for scanning a disc
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Label to record instead of the detected one
    pub label: Option<String>,
    /// Directory under which media are mounted per user
    pub mount_root: PathBuf,
    /// Exact mount point, bypassing resolution from the volume label
    pub mount_path: Option<PathBuf>,
    /// User whose mount directory holds the medium
    pub user: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            label: None,
            mount_root: PathBuf::from(config::DEFAULT_MOUNT_ROOT),
            mount_path: None,
            user: None,
        }
    }
}

/// Result of scanning a disc
#[derive(Debug)]
pub struct ScanOutcome {
    pub disc: Disc,
    pub mount_path: PathBuf,
}

/// Scan the medium in the inspected device and return a disc ready for the catalog
///
/// # Arguments
/// * `inspector` - Source of device presence and volume properties
/// * `opts` - Scan options
///
/// # Errors
/// Fails with `NoDevice` or `NoMedium` before touching the filesystem, and
/// propagates any I/O error raised while walking the mounted tree.
pub fn scan_disc(inspector: &dyn DeviceInspector, opts: &ScanOptions) -> Result<ScanOutcome> {
    if !inspector.is_present() {
        return Err(Error::NoDevice {
            device: inspector.device().to_path_buf(),
        });
    }

    let properties = device::filter_properties(inspector.properties()?);
    log::info!(
        "Inspection of {} yielded {} usable properties",
        inspector.device().display(),
        properties.len()
    );
    if properties.len() < device::MIN_MEDIUM_PROPERTIES {
        return Err(Error::NoMedium {
            device: inspector.device().to_path_buf(),
        });
    }

    let label = opts
        .label
        .clone()
        .unwrap_or_else(|| device::select_label(&properties));

    let mount_path = match &opts.mount_path {
        Some(path) => path.clone(),
        None => services::mount::resolve_mount_point(
            &properties,
            &opts.mount_root,
            opts.user.as_deref(),
        )?,
    };
    log::debug!("Reading disc content from {}", mount_path.display());

    let content = snapshot_directory(&mount_path)?;
    let disc = Disc::new(label, properties, content);

    Ok(ScanOutcome { disc, mount_path })
}

/// Snapshot the directory tree rooted at `root`
///
/// # Errors
/// Returns `InvalidInput` when `root` is missing or not a directory, and
/// `Io` for any failure during the walk.
pub fn snapshot_directory<P: AsRef<Path>>(root: P) -> Result<Tree> {
    let root = root.as_ref();
    let root_path = root.to_string_lossy();

    if !root.exists() {
        return Err(Error::InvalidInput(format!(
            "Path does not exist: {root_path}"
        )));
    }

    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Path is not a directory: {root_path}"
        )));
    }

    Ok(services::traverse::build_tree(root)?)
}
