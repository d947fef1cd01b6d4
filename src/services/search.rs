//! Search projection: prune a snapshot down to matching entries and their ancestors

use crate::models::{Disc, DiscId, Entry, EntryKind, Tree};
use crate::services::catalog::Catalog;
use crate::services::matcher::Query;

/// A disc with at least one match, and the pruned tree of its matches
#[derive(Debug)]
pub struct SearchHit<'a> {
    pub id: DiscId,
    pub disc: &'a Disc,
    pub matches: Tree,
}

/// Search every disc, keeping only those with a non-empty projection.
#[must_use]
pub fn search_catalog<'a>(catalog: &'a Catalog, query: &Query) -> Vec<SearchHit<'a>> {
    catalog
        .iter()
        .filter_map(|(id, disc)| {
            let matches = project(disc.content(), query);
            (!matches.is_empty()).then_some(SearchHit { id, disc, matches })
        })
        .collect()
}

/// Project `tree` onto the entries relevant to `query`.
///
/// Matching files are kept. A folder whose own name matches is kept whole;
/// otherwise it is kept only if something beneath it matches, and then
/// carries just those descendants (size and mtime preserved, atime and
/// ctime dropped).
#[must_use]
pub fn project(tree: &Tree, query: &Query) -> Tree {
    let mut output = Tree::new();

    for (name, entry) in tree {
        match entry.kind() {
            EntryKind::File => {
                if query.matches(name) {
                    output.insert(name.clone(), entry.clone());
                }
            }
            EntryKind::Folder { entries } => {
                if query.matches(name) {
                    output.insert(name.clone(), entry.clone());
                } else {
                    let walked = project(entries, query);
                    if !walked.is_empty() {
                        output.insert(name.clone(), Entry::pruned(entry, walked));
                    }
                }
            }
        }
    }

    output
}
