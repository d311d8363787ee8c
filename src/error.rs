//! Error types for archive creation and extraction.
//!
//! Every fallible operation in the crate returns [`MtarError`]. Variants
//! carry the path that failed where one exists, so the rendered message is
//! enough for a user to act on.
//!
//! | Stage      | Errors |
//! |------------|--------|
//! | Create     | [`NoInput`], [`AlreadyExists`], [`SourceUnreadable`], [`SourceTooLarge`] |
//! | Format     | [`EndOfInput`], [`Corrupt`], [`InvalidName`], [`CorruptArchive`] |
//! | Extract    | [`NotFound`], [`Unreadable`], [`OutputUnwritable`], [`OutputExists`] |
//! | Other      | [`OutOfMemory`], [`Io`] |
//!
//! [`NoInput`]: MtarError::NoInput
//! [`AlreadyExists`]: MtarError::AlreadyExists
//! [`SourceUnreadable`]: MtarError::SourceUnreadable
//! [`SourceTooLarge`]: MtarError::SourceTooLarge
//! [`EndOfInput`]: MtarError::EndOfInput
//! [`Corrupt`]: MtarError::Corrupt
//! [`InvalidName`]: MtarError::InvalidName
//! [`CorruptArchive`]: MtarError::CorruptArchive
//! [`NotFound`]: MtarError::NotFound
//! [`Unreadable`]: MtarError::Unreadable
//! [`OutputUnwritable`]: MtarError::OutputUnwritable
//! [`OutputExists`]: MtarError::OutputExists
//! [`OutOfMemory`]: MtarError::OutOfMemory
//! [`Io`]: MtarError::Io

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for mtar operations.
#[derive(Debug)]
pub enum MtarError {
    /// `create` was called with an empty file list.
    NoInput,

    /// The archive path already exists; creation never overwrites.
    AlreadyExists { path: PathBuf },

    /// A source file could not be opened or read.
    SourceUnreadable { path: PathBuf, source: io::Error },

    /// A source file does not fit in the 4-byte signed size field.
    SourceTooLarge { path: PathBuf },

    /// Reserving memory for the header failed.
    OutOfMemory,

    /// The stream ended in the middle of a header field.
    EndOfInput,

    /// A header field holds a value the format does not allow.
    Corrupt(String),

    /// An entry name cannot be stored (empty or containing a NUL byte).
    InvalidName(String),

    /// The archive is shorter than, or inconsistent with, its own header.
    CorruptArchive { path: PathBuf, reason: String },

    /// The archive to read does not exist.
    NotFound { path: PathBuf },

    /// The archive exists but could not be opened.
    Unreadable { path: PathBuf, source: io::Error },

    /// An extraction target could not be created or written.
    OutputUnwritable { path: PathBuf, source: io::Error },

    /// An extraction target exists and overwriting is disabled.
    OutputExists { path: PathBuf },

    /// Any other I/O failure, treated as fatal.
    Io(io::Error),
}

impl fmt::Display for MtarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInput => write!(f, "No input files given"),
            Self::AlreadyExists { path } => {
                write!(f, "The mtar file {} already exists", path.display())
            }
            Self::SourceUnreadable { path, source } => {
                write!(f, "Not possible to open {}: {}", path.display(), source)
            }
            Self::SourceTooLarge { path } => write!(
                f,
                "{} is larger than {} bytes and cannot be archived",
                path.display(),
                i32::MAX
            ),
            Self::OutOfMemory => write!(f, "Out of memory while building the header"),
            Self::EndOfInput => write!(f, "Unexpected end of input"),
            Self::Corrupt(reason) => write!(f, "Corrupt header: {}", reason),
            Self::InvalidName(name) => write!(f, "Invalid entry name: {:?}", name),
            Self::CorruptArchive { path, reason } => {
                write!(f, "Corrupt mtar file {}: {}", path.display(), reason)
            }
            Self::NotFound { path } => write!(f, "The mtar file {} does not exist", path.display()),
            Self::Unreadable { path, source } => {
                write!(f, "The mtar file {} could not be opened: {}", path.display(), source)
            }
            Self::OutputUnwritable { path, source } => {
                write!(f, "Cannot write {}: {}", path.display(), source)
            }
            Self::OutputExists { path } => {
                write!(f, "{} already exists (use -o to overwrite)", path.display())
            }
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for MtarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnreadable { source, .. }
            | Self::Unreadable { source, .. }
            | Self::OutputUnwritable { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MtarError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::EndOfInput
        } else {
            Self::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, MtarError>;
