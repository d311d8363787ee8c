//! Archive extraction and listing.
//!
//! Entry names come from untrusted archive data, so every name is resolved
//! to a path below the output directory before anything is written: leading
//! roots are stripped the way tar does and `..` components are rejected.
//! Each file is written to a temporary sibling and only moved onto its
//! final name once all of its bytes arrived, so a failed extraction never
//! leaves a short file behind or clobbers an existing one.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use super::header::read_header;
use super::structures::{Header, HeaderEntry};
use crate::error::{MtarError, Result};
use crate::io::copy_bounded;

/// Extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory entry names are resolved against.
    pub output_dir: PathBuf,
    /// Replace files that already exist instead of failing.
    pub overwrite: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overwrite: false,
        }
    }
}

/// Outcome of a successful [`ArchiveExtractor::extract`].
#[derive(Debug, Clone)]
pub struct ExtractSummary {
    pub header: Header,
    /// Paths written, in header order.
    pub written: Vec<PathBuf>,
}

/// Reads an archive back into individual files.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    archive: PathBuf,
    options: ExtractOptions,
}

impl ArchiveExtractor {
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            options: ExtractOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Read only the header.
    pub fn list(&self) -> Result<Header> {
        let (_, header) = self.load()?;
        Ok(header)
    }

    /// Recreate every entry under the output directory.
    ///
    /// All names are checked before the first file is created. Entries are
    /// then processed in header order and extraction stops at the first
    /// failure; files completed before that point are kept.
    pub fn extract(&self) -> Result<ExtractSummary> {
        let (mut reader, header) = self.load()?;

        let targets = header
            .entries()
            .iter()
            .map(|entry| self.target_path(&entry.name))
            .collect::<Result<Vec<_>>>()?;

        for (index, (entry, target)) in header.entries().iter().zip(&targets).enumerate() {
            debug!("extracting entry {}: {}", index, entry.name);
            self.extract_entry(&mut reader, entry, target)?;
        }

        info!(
            "extracted {} file(s) from {}",
            targets.len(),
            self.archive.display()
        );
        Ok(ExtractSummary {
            header,
            written: targets,
        })
    }

    /// Open the archive and decode its header.
    ///
    /// The returned reader is positioned at the start of the data region.
    /// Any header failure, including an entry count too large to allocate,
    /// is reported as [`MtarError::CorruptArchive`].
    fn load(&self) -> Result<(BufReader<File>, Header)> {
        let unreadable = |source| MtarError::Unreadable {
            path: self.archive.clone(),
            source,
        };

        let file = File::open(&self.archive).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MtarError::NotFound {
                path: self.archive.clone(),
            },
            _ => unreadable(e),
        })?;
        if file.metadata().map_err(unreadable)?.is_dir() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "is a directory",
            )));
        }

        let mut reader = BufReader::new(file);
        let header = read_header(&mut reader).map_err(|e| match e {
            MtarError::EndOfInput => self.corrupt("header ends prematurely".to_string()),
            MtarError::Corrupt(reason) => self.corrupt(reason),
            MtarError::OutOfMemory => {
                self.corrupt("entry count is too large to be genuine".to_string())
            }
            other => self.corrupt(other.to_string()),
        })?;
        debug!(
            "{}: {} entries, data region at {}",
            self.archive.display(),
            header.file_count(),
            header.byte_size()
        );

        Ok((reader, header))
    }

    /// Resolve an entry name to a path inside the output directory.
    fn target_path(&self, name: &str) -> Result<PathBuf> {
        let mut relative = PathBuf::new();
        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::RootDir | Component::Prefix(_) => {
                    debug!("stripping leading root from {}", name)
                }
                Component::ParentDir => {
                    return Err(self.corrupt(format!(
                        "entry {} points outside the output directory",
                        name
                    )));
                }
            }
        }

        if relative.as_os_str().is_empty() {
            return Err(self.corrupt(format!("entry {:?} has no file name", name)));
        }
        Ok(self.options.output_dir.join(relative))
    }

    fn extract_entry<R: Read>(
        &self,
        reader: &mut R,
        entry: &HeaderEntry,
        target: &Path,
    ) -> Result<()> {
        if !self.options.overwrite && fs::symlink_metadata(target).is_ok() {
            return Err(MtarError::OutputExists {
                path: target.to_path_buf(),
            });
        }

        let mut staged = self.stage_output(target)?;
        self.transfer(reader, staged.as_file_mut(), entry, target)?;
        self.commit_output(staged, target)
    }

    /// Copy exactly `entry.size` bytes into `output`.
    fn transfer<R: Read, W: Write>(
        &self,
        reader: &mut R,
        output: &mut W,
        entry: &HeaderEntry,
        target: &Path,
    ) -> Result<()> {
        let expected = u64::from(entry.size);
        let copied = copy_bounded(reader, output, expected)
            .and_then(|copied| output.flush().map(|()| copied))
            .map_err(|source| MtarError::OutputUnwritable {
                path: target.to_path_buf(),
                source,
            })?;

        if copied < expected {
            return Err(self.corrupt(format!(
                "{} declares {} bytes but only {} remain",
                entry.name, expected, copied
            )));
        }
        Ok(())
    }

    /// Temporary file next to `target`; removed on drop unless committed.
    fn stage_output(&self, target: &Path) -> Result<NamedTempFile> {
        let unwritable = |source| MtarError::OutputUnwritable {
            path: target.to_path_buf(),
            source,
        };

        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(unwritable)?;
        NamedTempFile::new_in(parent).map_err(unwritable)
    }

    fn commit_output(&self, staged: NamedTempFile, target: &Path) -> Result<()> {
        let persisted = if self.options.overwrite {
            staged.persist(target)
        } else {
            staged.persist_noclobber(target)
        };

        persisted.map(drop).map_err(|e| {
            let source = e.error;
            match source.kind() {
                io::ErrorKind::AlreadyExists => MtarError::OutputExists {
                    path: target.to_path_buf(),
                },
                _ => {
                    warn!("could not move extracted data to {}", target.display());
                    MtarError::OutputUnwritable {
                        path: target.to_path_buf(),
                        source,
                    }
                }
            }
        })
    }

    fn corrupt(&self, reason: String) -> MtarError {
        MtarError::CorruptArchive {
            path: self.archive.clone(),
            reason,
        }
    }
}
