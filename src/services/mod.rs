//! Core services for scanning, cataloging, matching, and search projection

pub mod catalog;
pub mod device;
pub mod format;
pub mod matcher;
pub mod mount;
pub mod search;
pub mod traverse;
