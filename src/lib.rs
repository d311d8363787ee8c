//! # mtar
//!
//! A minimal tar-like archiver.
//!
//! An mtar archive is a compact header listing `(name, size)` pairs
//! followed by the raw contents of each file, back to back. Archives are
//! written in two passes: space for the header is reserved, file contents
//! are streamed in, and the header is written last once every size is
//! known. Extraction reads the header and then slices the data region by
//! the recorded sizes.
//!
//! ## Features
//!
//! - Exclusive archive creation that never overwrites an existing file
//! - No partial archive is left behind when creation fails
//! - Truncated or inconsistent archives are reported, never silently
//!   extracted short
//! - Entry names cannot escape the extraction directory, and a failed
//!   extraction never replaces an existing file
//! - Header listing without touching the data region
//!
//! ## Example
//!
//! ```no_run
//! use mtar::{ArchiveExtractor, ExtractOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     mtar::create("out.mtar", ["a.txt", "b.txt"])?;
//!
//!     let summary = ArchiveExtractor::new("out.mtar")
//!         .with_options(ExtractOptions {
//!             output_dir: "restored".into(),
//!             overwrite: false,
//!         })
//!         .extract()?;
//!     for path in &summary.written {
//!         println!("{}", path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod mtar;

pub use cli::Cli;
pub use error::{MtarError, Result};
pub use mtar::{
    ArchiveBuilder, ArchiveExtractor, CreateSummary, ExtractOptions, ExtractSummary, Header,
    HeaderEntry, create, extract, list,
};
