//! Catalog persistence

pub mod store;
