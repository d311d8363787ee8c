//! The mtar archive format and the operations built on it.
//!
//! ## Format Overview
//!
//! An archive is a header followed by a data region:
//!
//! ```text
//! [file count: i32]
//! file count times: [name][0x00][size: i32]
//! [data of entry 0][data of entry 1]...
//! ```
//!
//! Integers are little-endian. The data region has no padding or
//! separators, so entry `i` starts at the header size plus the sizes of
//! entries `0..i` (see [`Header::data_offset`]).
//!
//! ## Architecture
//!
//! - [`structures`]: in-memory header types and format constants
//! - [`header`]: header encoding, decoding and size computation
//! - [`builder`]: archive creation (reserve header, stream data, backfill)
//! - [`extractor`]: header loading, listing and extraction
//!
//! ## Limitations
//!
//! - No compression
//! - No permissions or timestamps
//! - Entries are limited to `i32::MAX` bytes
//! - Archives cannot be appended to or updated in place

mod builder;
mod extractor;
mod header;
mod structures;

use std::path::Path;

pub use builder::{ArchiveBuilder, CreateSummary};
pub use extractor::{ArchiveExtractor, ExtractOptions, ExtractSummary};
pub use header::{header_byte_size, read_header, write_header};
pub use structures::*;

use crate::error::Result;

/// Create `archive` from `sources`, in order. See [`ArchiveBuilder::create`].
pub fn create<P, I, S>(archive: P, sources: I) -> Result<CreateSummary>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ArchiveBuilder::new(archive.as_ref(), sources).create()
}

/// Extract every entry of `archive` into the current directory.
pub fn extract<P: AsRef<Path>>(archive: P) -> Result<ExtractSummary> {
    ArchiveExtractor::new(archive.as_ref()).extract()
}

/// Read the header of `archive` without extracting anything.
pub fn list<P: AsRef<Path>>(archive: P) -> Result<Header> {
    ArchiveExtractor::new(archive.as_ref()).list()
}
