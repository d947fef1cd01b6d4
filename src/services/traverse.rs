//! Filesystem traversal producing immutable snapshot trees

use crate::models::{Entry, Timestamps, Tree};
use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Build the snapshot tree for the directory at `path`.
///
/// Children are fully built before their parent, so every folder's size is
/// the sum of its children's sizes. Regular files and directories are
/// recorded; symbolic links, devices, sockets and FIFOs are skipped.
/// Any I/O error aborts the walk.
pub fn build_tree(path: &Path) -> io::Result<Tree> {
    let mut tree = Tree::new();

    for dir_entry in fs::read_dir(path)? {
        let dir_entry = dir_entry?;
        let child_path = dir_entry.path();
        let name = entry_name(&dir_entry);
        let metadata = fs::symlink_metadata(&child_path)?;
        let file_type = metadata.file_type();

        if file_type.is_file() {
            log::trace!("File {}: {} bytes", child_path.display(), metadata.len());
            tree.insert(name, Entry::file(metadata.len(), timestamps(&metadata)));
        } else if file_type.is_dir() {
            let children = build_tree(&child_path)?;
            let folder = Entry::folder(children, timestamps(&metadata));
            log::trace!("Folder {}: {} bytes", child_path.display(), folder.size());
            tree.insert(name, folder);
        } else {
            log::debug!(
                "Skipping {} (neither a regular file nor a directory)",
                child_path.display()
            );
        }
    }

    Ok(tree)
}

fn entry_name(dir_entry: &fs::DirEntry) -> String {
    match dir_entry.file_name().into_string() {
        Ok(name) => name,
        Err(raw) => {
            let lossy = raw.to_string_lossy().into_owned();
            log::warn!("Entry name is not valid UTF-8, recording it as {lossy:?}");
            lossy
        }
    }
}

#[cfg(unix)]
#[allow(clippy::cast_precision_loss)]
fn timestamps(metadata: &fs::Metadata) -> Timestamps {
    let seconds = |secs: i64, nsecs: i64| secs as f64 + nsecs as f64 / 1e9;
    Timestamps::new(
        seconds(metadata.atime(), metadata.atime_nsec()),
        seconds(metadata.mtime(), metadata.mtime_nsec()),
        seconds(metadata.ctime(), metadata.ctime_nsec()),
    )
}

#[cfg(not(unix))]
fn timestamps(metadata: &fs::Metadata) -> Timestamps {
    use std::time::{SystemTime, UNIX_EPOCH};

    let seconds = |time: io::Result<SystemTime>| {
        time.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0.0, |d| d.as_secs_f64())
    };
    Timestamps::new(
        seconds(metadata.accessed()),
        seconds(metadata.modified()),
        seconds(metadata.created()),
    )
}
