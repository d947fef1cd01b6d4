//! Runtime configuration: catalog location, drive, and mount layout

use std::path::PathBuf;

pub const DEFAULT_CATALOG_PATH: &str = "./catalog.parquet";
pub const DEFAULT_DEVICE: &str = "/dev/sr0";
pub const DEFAULT_MOUNT_ROOT: &str = "/media";

/// Resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_path: PathBuf,
    /// Optical drive to inspect; pick a different node when several drives are attached
    pub device: PathBuf,
    pub mount_root: PathBuf,
    pub mount_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            device: PathBuf::from(DEFAULT_DEVICE),
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            mount_path: None,
        }
    }
}

/// Name of the user whose mount directory holds removable media.
///
/// Reads `USER`, then `LOGNAME`.
#[must_use]
pub fn current_user() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
}
