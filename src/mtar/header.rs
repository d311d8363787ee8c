//! Header serialization.
//!
//! Layout, all integers 4-byte signed little-endian:
//!
//! ```text
//! [file count]
//! file count times: [name bytes][0x00][size]
//! ```
//!
//! The data region follows immediately, with no padding.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::trace;

use super::structures::{Header, HeaderEntry, INT_FIELD_SIZE};
use crate::error::{MtarError, Result};
use crate::io::{read_name, write_name};

/// Read a header from the start of an archive.
///
/// On success the stream is positioned at the first byte of the data
/// region. On failure nothing partially decoded escapes: the entries read
/// so far are owned by this frame and dropped with it.
pub fn read_header<R: Read>(stream: &mut R) -> Result<Header> {
    let count = stream.read_i32::<LittleEndian>()?;
    if count < 0 {
        return Err(MtarError::Corrupt(format!("negative file count {}", count)));
    }
    let count = count as usize;

    let mut entries: Vec<HeaderEntry> = Vec::new();
    entries
        .try_reserve_exact(count)
        .map_err(|_| MtarError::OutOfMemory)?;

    for index in 0..count {
        let name = read_name(stream)?;
        if name.is_empty() {
            return Err(MtarError::Corrupt(format!("entry {} has an empty name", index)));
        }

        let size = stream.read_i32::<LittleEndian>()?;
        if size < 0 {
            return Err(MtarError::Corrupt(format!(
                "entry {} ({}) has negative size {}",
                index, name, size
            )));
        }

        trace!("header entry {}: {} ({} bytes)", index, name, size);
        entries.push(HeaderEntry {
            name,
            size: size as u32,
        });
    }

    Ok(Header::new(entries))
}

/// Write `header` at the current stream position.
///
/// The caller positions the stream at offset 0 of the archive.
pub fn write_header<W: Write>(stream: &mut W, header: &Header) -> Result<()> {
    let count = i32::try_from(header.file_count())
        .map_err(|_| MtarError::Corrupt(format!("too many entries: {}", header.file_count())))?;
    stream.write_i32::<LittleEndian>(count)?;

    for entry in header.entries() {
        let size = i32::try_from(entry.size).map_err(|_| {
            MtarError::Corrupt(format!("size {} of {} does not fit", entry.size, entry.name))
        })?;
        write_name(stream, &entry.name)?;
        stream.write_i32::<LittleEndian>(size)?;
    }

    Ok(())
}

/// Number of bytes [`write_header`] produces for `entries`.
pub fn header_byte_size(entries: &[HeaderEntry]) -> u64 {
    INT_FIELD_SIZE + entries.iter().map(HeaderEntry::record_size).sum::<u64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded(header: &Header) -> Vec<u8> {
        let mut out = Vec::new();
        write_header(&mut out, header).unwrap();
        out
    }

    #[test]
    fn byte_exact_layout() {
        let header = Header::new(vec![
            HeaderEntry::new("a.txt", 2).unwrap(),
            HeaderEntry::new("b.txt", 4).unwrap(),
        ]);

        let mut expected = vec![2, 0, 0, 0];
        expected.extend_from_slice(b"a.txt\0");
        expected.extend_from_slice(&[2, 0, 0, 0]);
        expected.extend_from_slice(b"b.txt\0");
        expected.extend_from_slice(&[4, 0, 0, 0]);

        let bytes = encoded(&header);
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len() as u64, header_byte_size(header.entries()));
    }

    #[test]
    fn read_leaves_cursor_at_data() {
        let header = Header::new(vec![
            HeaderEntry::new("docs/readme", 3).unwrap(),
            HeaderEntry::new("x", 0).unwrap(),
        ]);
        let mut bytes = encoded(&header);
        let data_start = bytes.len() as u64;
        bytes.extend_from_slice(b"abc");

        let mut cursor = Cursor::new(bytes);
        let decoded = read_header(&mut cursor).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(cursor.position(), data_start);
    }

    #[test]
    fn empty_header_is_four_bytes() {
        let header = Header::default();
        assert_eq!(encoded(&header), vec![0, 0, 0, 0]);
        assert_eq!(header_byte_size(&[]), 4);
    }

    #[test]
    fn short_count_is_end_of_input() {
        let mut cursor = Cursor::new(vec![1, 0]);
        assert!(matches!(read_header(&mut cursor), Err(MtarError::EndOfInput)));
    }

    #[test]
    fn truncated_records_are_end_of_input() {
        let header = Header::new(vec![
            HeaderEntry::new("one", 1).unwrap(),
            HeaderEntry::new("two", 2).unwrap(),
        ]);
        let bytes = encoded(&header);

        // Cut inside the second name, then inside the second size field.
        for cut in [bytes.len() - 6, bytes.len() - 2] {
            let mut cursor = Cursor::new(bytes[..cut].to_vec());
            assert!(matches!(read_header(&mut cursor), Err(MtarError::EndOfInput)));
        }
    }

    #[test]
    fn negative_fields_are_corrupt() {
        let mut cursor = Cursor::new((-1i32).to_le_bytes().to_vec());
        assert!(matches!(read_header(&mut cursor), Err(MtarError::Corrupt(_))));

        let mut bytes = 1i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"f\0");
        bytes.extend_from_slice(&(-5i32).to_le_bytes());
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(read_header(&mut cursor), Err(MtarError::Corrupt(_))));
    }

    #[test]
    fn empty_name_is_corrupt() {
        let mut bytes = 1i32.to_le_bytes().to_vec();
        bytes.push(0);
        bytes.extend_from_slice(&0i32.to_le_bytes());

        let mut cursor = Cursor::new(bytes);
        assert!(matches!(read_header(&mut cursor), Err(MtarError::Corrupt(_))));
    }
}
