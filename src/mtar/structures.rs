use crate::error::{MtarError, Result};

/// Width of every integer field in the header (file count and sizes).
pub const INT_FIELD_SIZE: u64 = 4;

/// Largest payload a single entry may declare.
pub const MAX_ENTRY_SIZE: u64 = i32::MAX as u64;

/// One `(name, size)` record of the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub size: u32,
}

impl HeaderEntry {
    pub fn new(name: impl Into<String>, size: u32) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.as_bytes().contains(&0) {
            return Err(MtarError::InvalidName(name));
        }
        if u64::from(size) > MAX_ENTRY_SIZE {
            return Err(MtarError::Corrupt(format!(
                "size {} of {} exceeds {}",
                size, name, MAX_ENTRY_SIZE
            )));
        }
        Ok(Self { name, size })
    }

    /// Bytes this record occupies in the serialized header.
    pub fn record_size(&self) -> u64 {
        self.name.len() as u64 + 1 + INT_FIELD_SIZE
    }
}

/// In-memory archive header: the ordered index into the data region.
///
/// The file count is not stored separately; it is always the number of
/// entries, so the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: Vec<HeaderEntry>,
}

impl Header {
    pub fn new(entries: Vec<HeaderEntry>) -> Self {
        Self { entries }
    }

    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [HeaderEntry] {
        &mut self.entries
    }

    pub fn into_entries(self) -> Vec<HeaderEntry> {
        self.entries
    }

    /// Serialized size of this header, i.e. where the data region starts.
    pub fn byte_size(&self) -> u64 {
        super::header_byte_size(&self.entries)
    }

    /// Total length of the data region.
    pub fn data_len(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.size)).sum()
    }

    /// Absolute archive offset of the first byte of entry `index`.
    pub fn data_offset(&self, index: usize) -> Option<u64> {
        if index >= self.entries.len() {
            return None;
        }
        let preceding: u64 = self.entries[..index]
            .iter()
            .map(|e| u64::from(e.size))
            .sum();
        Some(self.byte_size() + preceding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header::new(vec![
            HeaderEntry::new("a.txt", 2).unwrap(),
            HeaderEntry::new("b.txt", 4).unwrap(),
        ])
    }

    #[test]
    fn entry_rejects_bad_names() {
        assert!(matches!(HeaderEntry::new("", 0), Err(MtarError::InvalidName(_))));
        assert!(matches!(HeaderEntry::new("a\0b", 0), Err(MtarError::InvalidName(_))));
    }

    #[test]
    fn entry_rejects_oversized() {
        assert!(HeaderEntry::new("big", u32::MAX).is_err());
        assert!(HeaderEntry::new("max", i32::MAX as u32).is_ok());
    }

    #[test]
    fn offsets_accumulate_sizes() {
        let header = sample();

        // 4 + (5 + 1 + 4) * 2
        assert_eq!(header.byte_size(), 24);
        assert_eq!(header.data_offset(0), Some(24));
        assert_eq!(header.data_offset(1), Some(26));
        assert_eq!(header.data_offset(2), None);
        assert_eq!(header.data_len(), 6);
    }
}
