//! Mount point resolution for the scanned medium

use crate::config;
use crate::models::DeviceProperties;
use crate::services::device::decode_escaped;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolve `<mount_root>/<user>/<filesystem label>` for the medium.
///
/// Falls back to the current login when `user` is `None`. The path is not
/// checked for existence here.
///
/// # Errors
/// Returns `InvalidInput` if the medium has no encoded filesystem label or the
/// user cannot be determined.
pub fn resolve_mount_point(
    properties: &DeviceProperties,
    mount_root: &Path,
    user: Option<&str>,
) -> Result<PathBuf> {
    let label = properties
        .get("ID_FS_LABEL_ENC")
        .filter(|label| !label.is_empty())
        .map(|label| decode_escaped(label))
        .ok_or_else(|| {
            Error::InvalidInput(
                "medium reports no filesystem label; pass --mount-path to locate it".to_string(),
            )
        })?;

    let user = match user {
        Some(user) => user.to_string(),
        None => config::current_user().ok_or_else(|| {
            Error::InvalidInput(
                "cannot determine the current user from USER or LOGNAME".to_string(),
            )
        })?,
    };

    Ok(mount_root.join(user).join(label))
}
