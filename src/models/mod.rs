//! Data models for catalog entries, discs, and snapshot trees

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Identifier of a disc inside the catalog
pub type DiscId = u64;

/// Ordered mapping from entry name to entry, in filesystem enumeration order
pub type Tree = IndexMap<String, Entry>;

/// Device/volume properties captured at scan time
pub type DeviceProperties = BTreeMap<String, String>;

/// Timestamps captured from the filesystem, in fractional seconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atime: Option<f64>,
    pub mtime: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctime: Option<f64>,
}

impl Timestamps {
    #[must_use]
    pub fn new(atime: f64, mtime: f64, ctime: f64) -> Self {
        Self {
            atime: Some(atime),
            mtime,
            ctime: Some(ctime),
        }
    }

    /// Keep only the modification time.
    #[must_use]
    pub fn mtime_only(&self) -> Self {
        Self {
            atime: None,
            mtime: self.mtime,
            ctime: None,
        }
    }
}

/// Variant-specific part of an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder { entries: Tree },
}

/// A file or folder recorded in a snapshot.
///
/// Entries are immutable once built. A folder's size is the sum of its
/// children's sizes at construction time and is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    size: u64,
    #[serde(flatten)]
    times: Timestamps,
    #[serde(flatten)]
    kind: EntryKind,
}

impl Entry {
    #[must_use]
    pub fn file(size: u64, times: Timestamps) -> Self {
        Self {
            size,
            times,
            kind: EntryKind::File,
        }
    }

    /// Build a folder whose size is the sum of its children's sizes.
    #[must_use]
    pub fn folder(entries: Tree, times: Timestamps) -> Self {
        Self {
            size: tree_size(&entries),
            times,
            kind: EntryKind::Folder { entries },
        }
    }

    /// Build a folder that keeps `original`'s size and mtime but carries only `entries`.
    #[must_use]
    pub fn pruned(original: &Entry, entries: Tree) -> Self {
        Self {
            size: original.size,
            times: original.times.mtime_only(),
            kind: EntryKind::Folder { entries },
        }
    }

    /// Reassemble an entry from stored parts without touching its size.
    pub(crate) fn from_parts(size: u64, times: Timestamps, kind: EntryKind) -> Self {
        Self { size, times, kind }
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn times(&self) -> &Timestamps {
        &self.times
    }

    #[must_use]
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, EntryKind::Folder { .. })
    }

    /// Children of a folder, `None` for files
    #[must_use]
    pub fn entries(&self) -> Option<&Tree> {
        match &self.kind {
            EntryKind::File => None,
            EntryKind::Folder { entries } => Some(entries),
        }
    }
}

/// Sum of the sizes of a tree's top-level entries
#[must_use]
pub fn tree_size(tree: &Tree) -> u64 {
    tree.values().map(Entry::size).sum()
}

/// A scanned medium as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Disc {
    label: String,
    properties: DeviceProperties,
    content: Tree,
    size: u64,
}

impl Disc {
    #[must_use]
    pub fn new(label: String, properties: DeviceProperties, content: Tree) -> Self {
        let size = tree_size(&content);
        Self {
            label,
            properties,
            content,
            size,
        }
    }

    pub(crate) fn from_parts(
        label: String,
        properties: DeviceProperties,
        content: Tree,
        size: u64,
    ) -> Self {
        Self {
            label,
            properties,
            content,
            size,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    #[must_use]
    pub fn content(&self) -> &Tree {
        &self.content
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}
