use std::io::{self, Read, Write};

/// Copy at most `max` bytes from `src` to `dst`.
///
/// Stops silently when `src` runs dry, so the returned count may be smaller
/// than `max`. Both streams advance by exactly the returned count. Write
/// failures are returned as-is and must be treated as fatal by the caller.
pub fn copy_bounded<R, W>(src: &mut R, dst: &mut W, max: u64) -> io::Result<u64>
where
    R: Read,
    W: Write,
{
    let mut limited = src.take(max);
    io::copy(&mut limited, dst)
}
