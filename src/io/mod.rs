//! Stream-level building blocks shared by the archiver and the extractor.
//!
//! Both helpers are generic over [`std::io::Read`] / [`std::io::Write`] so
//! they work the same against files, buffered handles and in-memory cursors.

mod copy;
mod cstr;

pub use copy::copy_bounded;
pub use cstr::{read_name, write_name};
