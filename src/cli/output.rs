//! Output formatting for CLI

use crate::models::{Disc, DiscId, Tree};
use crate::services::catalog::Catalog;
use crate::services::format::{format_size, format_timestamp};
use crate::services::search::SearchHit;
use std::io::{self, Write};

/// Indentation for the given nesting level, four spaces per level
#[must_use]
pub fn indent(level: usize) -> String {
    " ".repeat(4 * level)
}

/// Write `tree` depth-first, one line per entry.
///
/// At every level files come first, then folders, each folder followed by
/// its own content one level deeper. Verbose lines carry sizes, and for
/// files the modification time.
pub fn write_tree<W: Write>(
    out: &mut W,
    tree: &Tree,
    level: usize,
    verbose: bool,
) -> io::Result<()> {
    let pad = indent(level);

    for (name, entry) in tree.iter().filter(|(_, entry)| entry.is_file()) {
        if verbose {
            writeln!(
                out,
                "{pad}a file {name} [size: {}] [modified: {}]",
                format_size(entry.size()),
                format_timestamp(entry.times().mtime)
            )?;
        } else {
            writeln!(out, "{pad}a file {name}")?;
        }
    }

    for (name, entry) in tree {
        let Some(children) = entry.entries() else {
            continue;
        };
        if verbose {
            writeln!(
                out,
                "{pad}a folder {name} [size: {}]:",
                format_size(entry.size())
            )?;
        } else {
            writeln!(out, "{pad}a folder {name}:")?;
        }
        write_tree(out, children, level + 1, verbose)?;
    }

    Ok(())
}

/// Header line for a disc, e.g. `[ID 3] disc HOLIDAYS_2019 [size: 4.2 GB]:`
#[must_use]
pub fn disc_header(id: DiscId, disc: &Disc, with_size: bool) -> String {
    if with_size {
        format!(
            "[ID {id}] disc {} [size: {}]:",
            disc.label(),
            format_size(disc.size())
        )
    } else {
        format!("[ID {id}] disc {}", disc.label())
    }
}

/// One header line per disc.
pub fn write_brief<W: Write>(out: &mut W, catalog: &Catalog, verbose: bool) -> io::Result<()> {
    for (id, disc) in catalog.iter() {
        writeln!(out, "{}", disc_header(id, disc, verbose))?;
    }
    writeln!(out)
}

/// Every disc with its complete tree.
pub fn write_listing<W: Write>(out: &mut W, catalog: &Catalog, verbose: bool) -> io::Result<()> {
    for (id, disc) in catalog.iter() {
        writeln!(out, "{}", disc_header(id, disc, verbose))?;
        write_tree(out, disc.content(), 1, verbose)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Discs with matches, each followed by its pruned tree.
pub fn write_search_results<W: Write>(
    out: &mut W,
    hits: &[SearchHit<'_>],
    verbose: bool,
) -> io::Result<()> {
    for hit in hits {
        writeln!(out, "{}", disc_header(hit.id, hit.disc, true))?;
        write_tree(out, &hit.matches, 1, verbose)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Format the brief listing as JSON
#[must_use]
pub fn format_brief_json(catalog: &Catalog) -> String {
    let discs: Vec<_> = catalog
        .iter()
        .map(|(id, disc)| {
            serde_json::json!({
                "id": id,
                "label": disc.label(),
                "size": disc.size(),
                "properties": disc.properties(),
            })
        })
        .collect();

    to_pretty(&serde_json::Value::Array(discs))
}

/// Format the full listing as JSON
#[must_use]
pub fn format_listing_json(catalog: &Catalog) -> String {
    let discs: Vec<_> = catalog
        .iter()
        .map(|(id, disc)| {
            serde_json::json!({
                "id": id,
                "label": disc.label(),
                "size": disc.size(),
                "properties": disc.properties(),
                "content": disc.content(),
            })
        })
        .collect();

    to_pretty(&serde_json::Value::Array(discs))
}

/// Format search results as JSON
#[must_use]
pub fn format_search_json(hits: &[SearchHit<'_>]) -> String {
    let discs: Vec<_> = hits
        .iter()
        .map(|hit| {
            serde_json::json!({
                "id": hit.id,
                "label": hit.disc.label(),
                "size": hit.disc.size(),
                "matches": hit.matches,
            })
        })
        .collect();

    to_pretty(&serde_json::Value::Array(discs))
}

fn to_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}
