//! Parquet catalog read/write operations
//!
//! The whole catalog is stored as one Parquet table. Every disc contributes a
//! record batch made of one `disc` row, its `property` rows, and its `entry`
//! rows flattened in pre-order with their depth, so trees can be rebuilt
//! without storing paths.

use crate::models::{DeviceProperties, Disc, DiscId, Entry, EntryKind, Timestamps, Tree};
use crate::services::catalog::Catalog;
use arrow_array::{
    Array, ArrayRef, Float64Array, RecordBatch, StringArray, UInt16Array, UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use indexmap::IndexMap;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::io::{Error, ErrorKind, Result};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const RECORD_DISC: &str = "disc";
const RECORD_PROPERTY: &str = "property";
const RECORD_ENTRY: &str = "entry";

const KIND_FILE: &str = "file";
const KIND_FOLDER: &str = "folder";

/// Return the Arrow schema shared by catalog writers and readers.
#[must_use]
pub fn catalog_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("disc_id", DataType::UInt64, false),
        Field::new("record", DataType::Utf8, false),
        Field::new("disc_label", DataType::Utf8, true),
        Field::new("disc_size", DataType::UInt64, true),
        Field::new("property_key", DataType::Utf8, true),
        Field::new("property_value", DataType::Utf8, true),
        Field::new("entry_name", DataType::Utf8, true),
        Field::new("entry_kind", DataType::Utf8, true),
        Field::new("entry_depth", DataType::UInt16, true),
        Field::new("entry_size", DataType::UInt64, true),
        Field::new("entry_atime", DataType::Float64, true),
        Field::new("entry_mtime", DataType::Float64, true),
        Field::new("entry_ctime", DataType::Float64, true),
    ]))
}

/// Location of a persisted catalog
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
}

impl CatalogFile {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog, or an empty one if the file does not exist yet.
    pub fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            log::debug!("No catalog at {}, starting empty", self.path.display());
            return Ok(Catalog::new());
        }
        read_catalog(&self.path)
    }

    /// Persist the whole catalog.
    ///
    /// Data goes to a sibling temporary file that then replaces the catalog.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        if let Err(e) = write_catalog(&temp_path, catalog)
            .and_then(|()| fs::rename(&temp_path, &self.path))
        {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        log::debug!("Saved {} discs to {}", catalog.len(), self.path.display());
        Ok(())
    }
}

/// One flattened row of the catalog table
#[derive(Debug, Default)]
struct CatalogRow<'a> {
    disc_id: DiscId,
    record: &'static str,
    disc_label: Option<&'a str>,
    disc_size: Option<u64>,
    property_key: Option<&'a str>,
    property_value: Option<&'a str>,
    entry_name: Option<&'a str>,
    entry_kind: Option<&'static str>,
    entry_depth: Option<u16>,
    entry_size: Option<u64>,
    entry_atime: Option<f64>,
    entry_mtime: Option<f64>,
    entry_ctime: Option<f64>,
}

/// Write a catalog to a Parquet file.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let file = File::create(path)?;
    let schema = catalog_schema();
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema.clone(), Some(props)).map_err(Error::other)?;

    for (id, disc) in catalog.iter() {
        let rows = disc_rows(id, disc)?;
        let batch = create_batch(&schema, &rows)?;
        writer.write(&batch).map_err(Error::other)?;
    }

    writer.close().map_err(Error::other)?;
    Ok(())
}

fn disc_rows(id: DiscId, disc: &Disc) -> Result<Vec<CatalogRow<'_>>> {
    let mut rows = vec![CatalogRow {
        disc_id: id,
        record: RECORD_DISC,
        disc_label: Some(disc.label()),
        disc_size: Some(disc.size()),
        ..CatalogRow::default()
    }];

    rows.extend(disc.properties().iter().map(|(key, value)| CatalogRow {
        disc_id: id,
        record: RECORD_PROPERTY,
        property_key: Some(key.as_str()),
        property_value: Some(value.as_str()),
        ..CatalogRow::default()
    }));

    flatten_tree(id, disc.content(), 0, &mut rows)?;
    Ok(rows)
}

fn flatten_tree<'a>(
    id: DiscId,
    tree: &'a Tree,
    depth: u16,
    rows: &mut Vec<CatalogRow<'a>>,
) -> Result<()> {
    for (name, entry) in tree {
        let times = entry.times();
        rows.push(CatalogRow {
            disc_id: id,
            record: RECORD_ENTRY,
            entry_name: Some(name.as_str()),
            entry_kind: Some(if entry.is_file() { KIND_FILE } else { KIND_FOLDER }),
            entry_depth: Some(depth),
            entry_size: Some(entry.size()),
            entry_atime: times.atime,
            entry_mtime: Some(times.mtime),
            entry_ctime: times.ctime,
            ..CatalogRow::default()
        });

        if let Some(children) = entry.entries() {
            let child_depth = depth
                .checked_add(1)
                .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Tree too deep to store"))?;
            flatten_tree(id, children, child_depth, rows)?;
        }
    }
    Ok(())
}

fn create_batch(schema: &Arc<Schema>, rows: &[CatalogRow<'_>]) -> Result<RecordBatch> {
    let ids: ArrayRef = Arc::new(UInt64Array::from(
        rows.iter().map(|r| r.disc_id).collect::<Vec<_>>(),
    ));
    let records: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.record).collect::<Vec<_>>(),
    ));
    let labels: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.disc_label).collect::<Vec<_>>(),
    ));
    let disc_sizes: ArrayRef = Arc::new(UInt64Array::from(
        rows.iter().map(|r| r.disc_size).collect::<Vec<_>>(),
    ));
    let keys: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.property_key).collect::<Vec<_>>(),
    ));
    let values: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.property_value).collect::<Vec<_>>(),
    ));
    let names: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.entry_name).collect::<Vec<_>>(),
    ));
    let kinds: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.entry_kind).collect::<Vec<_>>(),
    ));
    let depths: ArrayRef = Arc::new(UInt16Array::from(
        rows.iter().map(|r| r.entry_depth).collect::<Vec<_>>(),
    ));
    let sizes: ArrayRef = Arc::new(UInt64Array::from(
        rows.iter().map(|r| r.entry_size).collect::<Vec<_>>(),
    ));
    let atimes: ArrayRef = Arc::new(Float64Array::from(
        rows.iter().map(|r| r.entry_atime).collect::<Vec<_>>(),
    ));
    let mtimes: ArrayRef = Arc::new(Float64Array::from(
        rows.iter().map(|r| r.entry_mtime).collect::<Vec<_>>(),
    ));
    let ctimes: ArrayRef = Arc::new(Float64Array::from(
        rows.iter().map(|r| r.entry_ctime).collect::<Vec<_>>(),
    ));

    RecordBatch::try_new(
        schema.clone(),
        vec![
            ids, records, labels, disc_sizes, keys, values, names, kinds, depths, sizes, atimes,
            mtimes, ctimes,
        ],
    )
    .map_err(Error::other)
}

/// Entry row read back from storage, before tree assembly
struct StoredEntry {
    name: String,
    depth: u16,
    size: u64,
    times: Timestamps,
    is_folder: bool,
}

/// Disc being reassembled from its rows
struct PendingDisc {
    label: String,
    size: u64,
    properties: DeviceProperties,
    entries: Vec<StoredEntry>,
}

/// Read a catalog from a Parquet file.
pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let file = File::open(path)?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let mut reader = builder
        .build()
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let mut pending: IndexMap<DiscId, PendingDisc> = IndexMap::new();

    for batch_result in &mut reader {
        let batch = batch_result.map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

        for row_idx in 0..batch.num_rows() {
            let disc_id = require(get_u64_value(&batch, "disc_id", row_idx)?, "disc_id")?;
            let record = require(get_string_value(&batch, "record", row_idx)?, "record")?;

            match record.as_str() {
                RECORD_DISC => {
                    let disc = extract_disc(&batch, row_idx)?;
                    if pending.insert(disc_id, disc).is_some() {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            format!("Duplicate disc ID {disc_id}"),
                        ));
                    }
                }
                RECORD_PROPERTY => {
                    let key = require(
                        get_string_value(&batch, "property_key", row_idx)?,
                        "property_key",
                    )?;
                    let value = require(
                        get_string_value(&batch, "property_value", row_idx)?,
                        "property_value",
                    )?;
                    pending_disc(&mut pending, disc_id)?
                        .properties
                        .insert(key, value);
                }
                RECORD_ENTRY => {
                    let entry = extract_entry(&batch, row_idx)?;
                    pending_disc(&mut pending, disc_id)?.entries.push(entry);
                }
                other => {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!("Unknown record type: {other}"),
                    ));
                }
            }
        }
    }

    let mut discs = Vec::with_capacity(pending.len());
    for (id, disc) in pending {
        let mut rows = disc.entries.into_iter().peekable();
        let content = assemble_tree(&mut rows, 0);
        if let Some(orphan) = rows.next() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "Entry {:?} at depth {} has no parent in disc {id}",
                    orphan.name, orphan.depth
                ),
            ));
        }
        discs.push((
            id,
            Disc::from_parts(disc.label, disc.properties, content, disc.size),
        ));
    }

    Ok(Catalog::from_discs(discs))
}

/// Rebuild the tree at `depth` from pre-ordered rows.
fn assemble_tree<I>(rows: &mut Peekable<I>, depth: u16) -> Tree
where
    I: Iterator<Item = StoredEntry>,
{
    let mut tree = Tree::new();

    while let Some(row) = rows.next_if(|row| row.depth == depth) {
        let kind = if row.is_folder {
            let entries = match depth.checked_add(1) {
                Some(child_depth) => assemble_tree(rows, child_depth),
                None => Tree::new(),
            };
            EntryKind::Folder { entries }
        } else {
            EntryKind::File
        };
        tree.insert(row.name, Entry::from_parts(row.size, row.times, kind));
    }

    tree
}

fn pending_disc(
    pending: &mut IndexMap<DiscId, PendingDisc>,
    disc_id: DiscId,
) -> Result<&mut PendingDisc> {
    pending.get_mut(&disc_id).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Row refers to unknown disc ID {disc_id}"),
        )
    })
}

fn extract_disc(batch: &RecordBatch, row: usize) -> Result<PendingDisc> {
    let label = require(get_string_value(batch, "disc_label", row)?, "disc_label")?;
    let size = require(get_u64_value(batch, "disc_size", row)?, "disc_size")?;

    Ok(PendingDisc {
        label,
        size,
        properties: DeviceProperties::new(),
        entries: Vec::new(),
    })
}

fn extract_entry(batch: &RecordBatch, row: usize) -> Result<StoredEntry> {
    let name = require(get_string_value(batch, "entry_name", row)?, "entry_name")?;
    let kind = require(get_string_value(batch, "entry_kind", row)?, "entry_kind")?;
    let depth = require(get_u16_value(batch, "entry_depth", row)?, "entry_depth")?;
    let size = require(get_u64_value(batch, "entry_size", row)?, "entry_size")?;
    let mtime = require(get_f64_value(batch, "entry_mtime", row)?, "entry_mtime")?;
    let atime = get_f64_value(batch, "entry_atime", row)?;
    let ctime = get_f64_value(batch, "entry_ctime", row)?;

    let is_folder = match kind.as_str() {
        KIND_FILE => false,
        KIND_FOLDER => true,
        other => {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("Unknown entry kind: {other}"),
            ));
        }
    };

    Ok(StoredEntry {
        name,
        depth,
        size,
        times: Timestamps {
            atime,
            mtime,
            ctime,
        },
        is_folder,
    })
}

fn require<T>(value: Option<T>, col_name: &str) -> Result<T> {
    value.ok_or_else(|| Error::new(ErrorKind::InvalidData, format!("Missing {col_name}")))
}

fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, col_name: &str) -> Result<&'a A> {
    let col = batch.column_by_name(col_name).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Missing column: {col_name}"),
        )
    })?;

    col.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Invalid type for: {col_name}"),
        )
    })
}

fn get_string_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<String>> {
    let array = column::<StringArray>(batch, col_name)?;
    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row).to_string()))
    }
}

fn get_u16_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<u16>> {
    let array = column::<UInt16Array>(batch, col_name)?;
    Ok((!array.is_null(row)).then(|| array.value(row)))
}

fn get_u64_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<u64>> {
    let array = column::<UInt64Array>(batch, col_name)?;
    Ok((!array.is_null(row)).then(|| array.value(row)))
}

fn get_f64_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<f64>> {
    let array = column::<Float64Array>(batch, col_name)?;
    Ok((!array.is_null(row)).then(|| array.value(row)))
}
