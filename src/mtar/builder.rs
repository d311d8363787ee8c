//! Archive creation.
//!
//! The archive is written in three stages: the header is planned in memory
//! with every size still zero, source data is streamed in after a gap of
//! exactly the header's size, and the header is written into that gap once
//! all sizes are known. A guard removes the file if any stage fails.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::header::write_header;
use super::structures::{Header, HeaderEntry, MAX_ENTRY_SIZE};
use crate::error::{MtarError, Result};
use crate::io::copy_bounded;

/// Progress of an archive being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    HeaderPrepared,
    DataTransferred,
    Committed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::HeaderPrepared => "header prepared",
            Stage::DataTransferred => "data transferred",
            Stage::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Deletes the archive on drop unless it reached [`Stage::Committed`].
///
/// Declared before the archive writer so the handle is closed first.
struct PartialArchive<'a> {
    path: &'a Path,
    stage: Stage,
}

impl<'a> PartialArchive<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            stage: Stage::Init,
        }
    }

    fn advance(&mut self, stage: Stage) {
        debug!("{}: {} -> {}", self.path.display(), self.stage, stage);
        self.stage = stage;
    }
}

impl Drop for PartialArchive<'_> {
    fn drop(&mut self) {
        if self.stage == Stage::Committed {
            return;
        }
        match fs::remove_file(self.path) {
            Ok(()) => debug!(
                "aborted at stage '{}', removed {}",
                self.stage,
                self.path.display()
            ),
            Err(e) => warn!(
                "aborted at stage '{}', could not remove {}: {}",
                self.stage,
                self.path.display(),
                e
            ),
        }
    }
}

/// Outcome of a successful [`ArchiveBuilder::create`].
#[derive(Debug, Clone)]
pub struct CreateSummary {
    pub archive: PathBuf,
    pub header: Header,
    /// Size of the finished archive file.
    pub archive_len: u64,
}

/// Builds a new archive from an ordered list of source files.
///
/// Names are stored exactly as given; they are also the paths the sources
/// are read from.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    archive: PathBuf,
    sources: Vec<String>,
}

impl ArchiveBuilder {
    pub fn new<P, I, S>(archive: P, sources: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            archive: archive.into(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Write the archive.
    ///
    /// The archive path must not exist. On any failure the partially written
    /// file is removed, so the path is free again for a retry.
    pub fn create(&self) -> Result<CreateSummary> {
        if self.sources.is_empty() {
            return Err(MtarError::NoInput);
        }

        let file = self.open_exclusive()?;
        let mut partial = PartialArchive::new(&self.archive);
        let mut writer = BufWriter::new(file);

        let mut header = self.plan()?;
        let header_size = header.byte_size();
        partial.advance(Stage::HeaderPrepared);

        // Leave room for the header; it is written once sizes are known.
        writer.seek(SeekFrom::Start(header_size))?;
        for entry in header.entries_mut() {
            entry.size = self.append_source(&mut writer, &entry.name)?;
            debug!("added {} ({} bytes)", entry.name, entry.size);
        }
        partial.advance(Stage::DataTransferred);

        writer.rewind()?;
        write_header(&mut writer, &header)?;
        writer.flush()?;
        drop(writer);
        partial.advance(Stage::Committed);

        let archive_len = header_size + header.data_len();
        info!(
            "created {} with {} file(s), {} bytes",
            self.archive.display(),
            header.file_count(),
            archive_len
        );

        Ok(CreateSummary {
            archive: self.archive.clone(),
            header,
            archive_len,
        })
    }

    fn open_exclusive(&self) -> Result<File> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.archive)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => MtarError::AlreadyExists {
                    path: self.archive.clone(),
                },
                _ => MtarError::OutputUnwritable {
                    path: self.archive.clone(),
                    source: e,
                },
            })
    }

    /// Header with every name filled in and all sizes still zero.
    fn plan(&self) -> Result<Header> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(self.sources.len())
            .map_err(|_| MtarError::OutOfMemory)?;

        for name in &self.sources {
            entries.push(HeaderEntry::new(name.as_str(), 0)?);
        }
        Ok(Header::new(entries))
    }

    /// Copy one source file to the writer's position, returning its length.
    fn append_source<W: Write>(&self, writer: &mut W, name: &str) -> Result<u32> {
        let path = Path::new(name);
        let unreadable = |source| MtarError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let source = File::open(path).map_err(unreadable)?;
        if source.metadata().map_err(unreadable)?.is_dir() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "is a directory",
            )));
        }

        self.append_reader(source, writer, path)
    }

    /// Copy `source` into the archive, attributing faults to the side that
    /// raised them.
    fn append_reader<R: Read, W: Write>(
        &self,
        source: R,
        writer: &mut W,
        path: &Path,
    ) -> Result<u32> {
        let mut source = FaultTracking::new(source);

        let copied = match copy_bounded(&mut source, writer, MAX_ENTRY_SIZE + 1) {
            Ok(copied) => copied,
            Err(e) if source.failed => {
                return Err(MtarError::SourceUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                return Err(MtarError::OutputUnwritable {
                    path: self.archive.clone(),
                    source: e,
                });
            }
        };

        if copied > MAX_ENTRY_SIZE {
            return Err(MtarError::SourceTooLarge {
                path: path.to_path_buf(),
            });
        }
        Ok(copied as u32)
    }
}

/// Reader that remembers whether it returned an error.
struct FaultTracking<R> {
    inner: R,
    failed: bool,
}

impl<R> FaultTracking<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            failed: false,
        }
    }
}

impl<R: Read> Read for FaultTracking<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|e| {
            if e.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtar::header::read_header;
    use std::io::BufReader;
    use tempfile::tempdir;

    fn write_source(dir: &Path, name: &str, data: &[u8]) -> String {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn layout_matches_header_size() {
        let dir = tempdir().unwrap();
        let a = write_source(dir.path(), "a.txt", b"hi");
        let b = write_source(dir.path(), "b.txt", b"bye!");
        let archive = dir.path().join("out.mtar");

        let summary = ArchiveBuilder::new(&archive, [&a, &b]).create().unwrap();

        let mut reader = BufReader::new(File::open(&archive).unwrap());
        let header = read_header(&mut reader).unwrap();
        assert_eq!(header, summary.header);
        assert_eq!(header.entries()[0], HeaderEntry::new(a.as_str(), 2).unwrap());
        assert_eq!(header.entries()[1], HeaderEntry::new(b.as_str(), 4).unwrap());

        let mut data = Vec::new();
        reader.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"hibye!");

        let len = fs::metadata(&archive).unwrap().len();
        assert_eq!(len, summary.archive_len);
        assert_eq!(len - 6, header.byte_size());
    }

    #[test]
    fn empty_input_creates_nothing() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("none.mtar");

        let err = ArchiveBuilder::new(&archive, Vec::<String>::new())
            .create()
            .unwrap_err();

        assert!(matches!(err, MtarError::NoInput));
        assert!(!archive.exists());
    }

    #[test]
    fn existing_archive_is_untouched() {
        let dir = tempdir().unwrap();
        let a = write_source(dir.path(), "a.txt", b"hi");
        let archive = dir.path().join("out.mtar");
        fs::write(&archive, b"precious").unwrap();

        let err = ArchiveBuilder::new(&archive, [a]).create().unwrap_err();

        assert!(matches!(err, MtarError::AlreadyExists { .. }));
        assert_eq!(fs::read(&archive).unwrap(), b"precious");
    }

    #[test]
    fn missing_source_removes_archive() {
        let dir = tempdir().unwrap();
        let a = write_source(dir.path(), "a.txt", b"hi");
        let missing = dir.path().join("missing.txt").to_str().unwrap().to_string();
        let archive = dir.path().join("out.mtar");

        let err = ArchiveBuilder::new(&archive, [a, missing]).create().unwrap_err();

        assert!(matches!(err, MtarError::SourceUnreadable { .. }));
        assert!(!archive.exists());
    }

    #[test]
    fn directory_source_is_unreadable() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let archive = dir.path().join("out.mtar");

        let err = ArchiveBuilder::new(&archive, [sub.to_str().unwrap()])
            .create()
            .unwrap_err();

        assert!(matches!(err, MtarError::SourceUnreadable { .. }));
        assert!(!archive.exists());
    }

    #[test]
    fn empty_source_file() {
        let dir = tempdir().unwrap();
        let empty = write_source(dir.path(), "empty", b"");
        let archive = dir.path().join("out.mtar");

        let summary = ArchiveBuilder::new(&archive, [&empty]).create().unwrap();

        assert_eq!(summary.header.entries()[0].size, 0);
        assert_eq!(summary.archive_len, summary.header.byte_size());
    }

    #[test]
    fn empty_name_removes_archive() {
        let dir = tempdir().unwrap();
        let a = write_source(dir.path(), "a.txt", b"hi");
        let archive = dir.path().join("out.mtar");

        let err = ArchiveBuilder::new(&archive, [a, String::new()])
            .create()
            .unwrap_err();

        assert!(matches!(err, MtarError::InvalidName(_)));
        assert!(!archive.exists());
    }

    struct FailingRead;

    impl Read for FailingRead {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device went away"))
        }
    }

    struct FailingWrite;

    impl Write for FailingWrite {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn read_fault_names_the_source() {
        let builder = ArchiveBuilder::new("out.mtar", ["flaky.bin"]);
        let mut sink = Vec::new();

        let err = builder
            .append_reader(FailingRead, &mut sink, Path::new("flaky.bin"))
            .unwrap_err();

        match err {
            MtarError::SourceUnreadable { path, .. } => assert_eq!(path, Path::new("flaky.bin")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn write_fault_names_the_archive() {
        let builder = ArchiveBuilder::new("out.mtar", ["data.bin"]);

        let err = builder
            .append_reader(&b"payload"[..], &mut FailingWrite, Path::new("data.bin"))
            .unwrap_err();

        match err {
            MtarError::OutputUnwritable { path, .. } => assert_eq!(path, Path::new("out.mtar")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
