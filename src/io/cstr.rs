//! Null-terminated name fields.

use std::io::{self, Read, Write};

use crate::error::{MtarError, Result};

/// Read a NUL-terminated name.
///
/// Bytes are consumed one at a time, so on success the cursor sits right
/// after the terminator and nothing past it has been read. Hitting the end
/// of the stream before a terminator yields [`MtarError::EndOfInput`].
pub fn read_name<R: Read + ?Sized>(stream: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match stream.read(&mut byte) {
            Ok(0) => return Err(MtarError::EndOfInput),
            Ok(_) if byte[0] == 0 => break,
            Ok(_) => buf.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    buf.shrink_to_fit();
    String::from_utf8(buf).map_err(|e| {
        MtarError::Corrupt(format!(
            "entry name is not valid UTF-8: {}",
            String::from_utf8_lossy(e.as_bytes())
        ))
    })
}

/// Write `name` followed by one NUL byte, returning the bytes written.
pub fn write_name<W: Write + ?Sized>(stream: &mut W, name: &str) -> Result<usize> {
    if name.as_bytes().contains(&0) {
        return Err(MtarError::InvalidName(name.to_string()));
    }

    stream.write_all(name.as_bytes())?;
    stream.write_all(&[0])?;
    Ok(name.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_up_to_terminator() {
        let mut cursor = Cursor::new(b"a.txt\0rest".to_vec());

        assert_eq!(read_name(&mut cursor).unwrap(), "a.txt");
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn consecutive_names() {
        let mut cursor = Cursor::new(b"first\0second\0".to_vec());

        assert_eq!(read_name(&mut cursor).unwrap(), "first");
        assert_eq!(read_name(&mut cursor).unwrap(), "second");
    }

    #[test]
    fn missing_terminator_is_end_of_input() {
        let mut cursor = Cursor::new(b"unterminated".to_vec());
        assert!(matches!(read_name(&mut cursor), Err(MtarError::EndOfInput)));

        let mut empty = Cursor::new(Vec::new());
        assert!(matches!(read_name(&mut empty), Err(MtarError::EndOfInput)));
    }

    #[test]
    fn invalid_utf8_is_corrupt() {
        let mut cursor = Cursor::new(vec![0xff, 0xfe, 0x00]);
        assert!(matches!(read_name(&mut cursor), Err(MtarError::Corrupt(_))));
    }

    #[test]
    fn write_appends_terminator() {
        let mut out = Vec::new();

        assert_eq!(write_name(&mut out, "b.txt").unwrap(), 6);
        assert_eq!(out, b"b.txt\0");
    }

    #[test]
    fn write_rejects_embedded_nul() {
        let mut out = Vec::new();

        assert!(matches!(
            write_name(&mut out, "bad\0name"),
            Err(MtarError::InvalidName(_))
        ));
        assert!(out.is_empty());
    }
}
