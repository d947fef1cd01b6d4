//! Optical drive inspection and volume label selection
//!
//! Properties are obtained from `udevadm`, which reports both the drive and
//! the medium inside it. Only an allow-listed subset is kept with the disc.

use crate::models::DeviceProperties;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Properties retained from the device inspection
pub const PROPERTY_ALLOW_LIST: [&str; 17] = [
    "DEVNAME",
    "DEVTYPE",
    "ID_CDROM_MEDIA_BD",
    "ID_CDROM_MEDIA_STATE",
    "ID_CDROM_MEDIA_SESSION_COUNT",
    "ID_FS_LABEL",
    "ID_FS_LABEL_ENC",
    "ID_FS_TYPE",
    "ID_FS_VERSION",
    "ID_FS_USAGE",
    "ID_FS_UUID",
    "ID_FS_UUID_ENC",
    "ID_FS_VOLUME_SET_ID",
    "ID_FS_VOLUME_ID",
    "ID_FS_LOGICAL_VOLUME_ID",
    "ID_FS_APPLICATION_ID",
    "ID_FS_BOOT_SYSTEM_ID",
];

/// Fewer retained properties than this means no readable medium is loaded.
pub const MIN_MEDIUM_PROPERTIES: usize = 3;

/// Label recorded when the medium carries none
pub const UNKNOWN_LABEL: &str = "[unknown label]";

/// Properties consulted for the label, in order of precedence
const LABEL_PRECEDENCE: [&str; 3] = [
    "ID_FS_LOGICAL_VOLUME_ID",
    "ID_FS_VOLUME_SET_ID",
    "ID_FS_LABEL_ENC",
];

/// Source of drive presence and medium properties.
pub trait DeviceInspector {
    /// Device node being inspected
    fn device(&self) -> &Path;

    /// Whether the drive exists
    fn is_present(&self) -> bool;

    /// Raw key/value properties of the drive and its medium
    fn properties(&self) -> Result<DeviceProperties>;
}

/// Inspector backed by `udevadm info`
#[derive(Debug, Clone)]
pub struct UdevadmInspector {
    device: PathBuf,
}

impl UdevadmInspector {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(device: P) -> Self {
        Self {
            device: device.into(),
        }
    }
}

impl DeviceInspector for UdevadmInspector {
    fn device(&self) -> &Path {
        &self.device
    }

    fn is_present(&self) -> bool {
        is_block_device(&self.device)
    }

    fn properties(&self) -> Result<DeviceProperties> {
        let output = Command::new("udevadm")
            .args(["info", "-q", "property", "-x", "-n"])
            .arg(&self.device)
            .output()
            .map_err(|e| Error::Inspection(format!("failed to run udevadm: {e}")))?;

        if !output.status.success() {
            log::warn!(
                "udevadm exited with {} for {}: {}",
                output.status,
                self.device.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(DeviceProperties::new());
        }

        Ok(parse_properties(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(unix)]
fn is_block_device(path: &Path) -> bool {
    use rustix::fs::FileType;

    match rustix::fs::stat(path) {
        #[allow(clippy::unnecessary_cast)]
        Ok(stat) => FileType::from_raw_mode(stat.st_mode as _) == FileType::BlockDevice,
        Err(err) => {
            log::debug!("Cannot stat {}: {err}", path.display());
            false
        }
    }
}

#[cfg(not(unix))]
fn is_block_device(path: &Path) -> bool {
    path.exists()
}

/// Parse `KEY='value'` lines as printed by `udevadm info -q property -x`.
#[must_use]
pub fn parse_properties(output: &str) -> DeviceProperties {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            (key.to_string(), value.trim_matches('\'').to_string())
        })
        .collect()
}

/// Keep only allow-listed properties.
#[must_use]
pub fn filter_properties(properties: DeviceProperties) -> DeviceProperties {
    properties
        .into_iter()
        .filter(|(key, _)| PROPERTY_ALLOW_LIST.contains(&key.as_str()))
        .collect()
}

/// Choose the disc label from volume properties, decoding udev escapes.
#[must_use]
pub fn select_label(properties: &DeviceProperties) -> String {
    LABEL_PRECEDENCE
        .iter()
        .filter_map(|key| properties.get(*key))
        .find(|value| !value.is_empty())
        .map_or_else(|| UNKNOWN_LABEL.to_string(), |value| decode_escaped(value))
}

/// Decode backslash escapes (`\xHH`, `\\`, `\n`, ...) used in udev property values.
///
/// Escaped bytes are reassembled and read as UTF-8, replacing invalid sequences.
#[must_use]
pub fn decode_escaped(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 >= bytes.len() {
            decoded.push(bytes[i]);
            i += 1;
            continue;
        }

        let escaped = match bytes[i + 1] {
            b'x' => value
                .get(i + 2..i + 4)
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .map(|byte| (byte, 4)),
            b'\\' => Some((b'\\', 2)),
            b'\'' => Some((b'\'', 2)),
            b'"' => Some((b'"', 2)),
            b'n' => Some((b'\n', 2)),
            b't' => Some((b'\t', 2)),
            b'r' => Some((b'\r', 2)),
            b'0' => Some((b'\0', 2)),
            _ => None,
        };

        match escaped {
            Some((byte, consumed)) => {
                decoded.push(byte);
                i += consumed;
            }
            None => {
                decoded.push(b'\\');
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&decoded).into_owned()
}
