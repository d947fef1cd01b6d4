//! Test fixtures for deterministic testing

use discgatherer::cli::output::write_tree;
use discgatherer::services::device::DeviceInspector;
use discgatherer::{DeviceProperties, Entry, Result, Timestamps, Tree};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Total size of the tree created by `create_disc_fixture`
pub const FIXTURE_TOTAL: u64 = 13 + 1024 + 2048 + 512 + 100;

/// Create a directory laid out like a small data disc
pub fn create_disc_fixture(base: &Path) -> std::io::Result<PathBuf> {
    let disc_dir = base.join("HOLIDAYS_2019");

    fs::create_dir_all(disc_dir.join("photos/2019"))?;
    fs::create_dir_all(disc_dir.join("music"))?;

    write_file_sync(disc_dir.join("readme.txt"), b"Hello, World!")?; // 13 bytes
    write_file_sync(disc_dir.join("photos/holiday_beach.jpg"), &[b'A'; 1024])?;
    write_file_sync(disc_dir.join("photos/girlfriend.png"), &[b'B'; 2048])?;
    write_file_sync(disc_dir.join("photos/2019/party-girl.jpg"), &[b'C'; 512])?;
    write_file_sync(disc_dir.join("music/track01.mp3"), &[b'D'; 100])?;

    Ok(disc_dir)
}

pub fn write_file_sync<P: AsRef<Path>>(path: P, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Timestamps with atime and ctime offset from `mtime`
pub fn times(mtime: f64) -> Timestamps {
    Timestamps::new(mtime + 10.0, mtime, mtime + 20.0)
}

pub fn tree_of(entries: Vec<(&str, Entry)>) -> Tree {
    entries
        .into_iter()
        .map(|(name, entry)| (name.to_string(), entry))
        .collect()
}

/// Render `tree` into a string, as `write_tree` prints it
pub fn render_tree(tree: &Tree, level: usize, verbose: bool) -> String {
    let mut buffer = Vec::new();
    write_tree(&mut buffer, tree, level, verbose).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// In-memory tree mirroring `create_disc_fixture`, with a folder inserted before a file
pub fn sample_tree() -> Tree {
    let year = tree_of(vec![(
        "party-girl.jpg",
        Entry::file(512, times(1_500_000_000.0)),
    )]);
    let photos = tree_of(vec![
        ("holiday_beach.jpg", Entry::file(1024, times(1_500_000_000.0))),
        ("girlfriend.png", Entry::file(2048, times(1_500_000_000.5))),
        ("2019", Entry::folder(year, times(1_500_000_100.0))),
    ]);
    let music = tree_of(vec![("track01.mp3", Entry::file(100, times(1_400_000_000.0)))]);

    tree_of(vec![
        ("music", Entry::folder(music, times(1_400_000_100.0))),
        ("readme.txt", Entry::file(13, times(1_500_000_000.0))),
        ("photos", Entry::folder(photos, times(1_500_000_200.0))),
    ])
}

pub fn properties(pairs: &[(&str, &str)]) -> DeviceProperties {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Properties of a typical ISO 9660 data disc
pub fn data_disc_properties() -> DeviceProperties {
    properties(&[
        ("DEVNAME", "/dev/sr0"),
        ("DEVTYPE", "disk"),
        ("ID_CDROM_MEDIA_STATE", "complete"),
        ("ID_FS_LABEL", "HOLIDAYS_2019"),
        ("ID_FS_LABEL_ENC", "HOLIDAYS_2019"),
        ("ID_FS_TYPE", "iso9660"),
        ("ID_FS_UUID", "2019-08-01-12-00-00-00"),
        ("ID_SERIAL", "ASUS_DRW-24F1ST"),
    ])
}

/// Inspector returning canned answers instead of querying hardware
pub struct FakeInspector {
    pub device: PathBuf,
    pub present: bool,
    pub properties: DeviceProperties,
}

impl FakeInspector {
    pub fn with_properties(properties: DeviceProperties) -> Self {
        Self {
            device: PathBuf::from("/dev/sr0"),
            present: true,
            properties,
        }
    }

    pub fn absent() -> Self {
        Self {
            device: PathBuf::from("/dev/sr9"),
            present: false,
            properties: DeviceProperties::new(),
        }
    }
}

impl DeviceInspector for FakeInspector {
    fn device(&self) -> &Path {
        &self.device
    }

    fn is_present(&self) -> bool {
        self.present
    }

    fn properties(&self) -> Result<DeviceProperties> {
        Ok(self.properties.clone())
    }
}

/// Assert that every folder's size equals the sum of its children's sizes
pub fn assert_sizes_aggregate(tree: &Tree) {
    for (name, entry) in tree {
        if let Some(children) = entry.entries() {
            let sum: u64 = children.values().map(Entry::size).sum();
            assert_eq!(entry.size(), sum, "folder {name} size mismatch");
            assert_sizes_aggregate(children);
        }
    }
}
