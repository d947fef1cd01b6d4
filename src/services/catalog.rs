//! In-memory catalog of discs keyed by identifier

use crate::models::{Disc, DiscId};
use crate::{Error, Result};
use indexmap::IndexMap;

/// Ordered collection of discs.
///
/// Iteration follows insertion order, which can differ from numeric id order
/// once an id has been freed and reused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    discs: IndexMap<DiscId, Disc>,
    modified: bool,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from persisted discs; the result is not marked modified.
    #[must_use]
    pub fn from_discs<I>(discs: I) -> Self
    where
        I: IntoIterator<Item = (DiscId, Disc)>,
    {
        Self {
            discs: discs.into_iter().collect(),
            modified: false,
        }
    }

    /// Identifier the next added disc will receive
    #[must_use]
    pub fn next_id(&self) -> DiscId {
        self.discs.keys().max().map_or(1, |max| max + 1)
    }

    /// Insert a disc under the next free identifier and return that identifier.
    pub fn add(&mut self, disc: Disc) -> DiscId {
        let id = self.next_id();
        log::debug!("Adding disc {:?} under ID {id}", disc.label());
        self.discs.insert(id, disc);
        self.modified = true;
        id
    }

    /// Remove and return the disc stored under `id`.
    ///
    /// # Errors
    /// Returns `NotFound` and leaves the catalog untouched if `id` is absent.
    pub fn remove(&mut self, id: DiscId) -> Result<Disc> {
        let disc = self.discs.shift_remove(&id).ok_or(Error::NotFound(id))?;
        log::debug!("Removed disc {:?} under ID {id}", disc.label());
        self.modified = true;
        Ok(disc)
    }

    #[must_use]
    pub fn get(&self, id: DiscId) -> Option<&Disc> {
        self.discs.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DiscId, &Disc)> {
        self.discs.iter().map(|(id, disc)| (*id, disc))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.discs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discs.is_empty()
    }

    /// Whether any add or remove succeeded since the catalog was loaded
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}
