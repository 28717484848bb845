pub mod elf;
pub mod macho;
pub mod pe;

use crate::binary::{Architecture, Endianness, OperatingSystem};
use crate::error::{IdentifyError, Result};
use crate::format::Format;

pub trait Header: std::fmt::Debug + Send + Sync {
    /// Decodes the header at the start of `buf`, validating every field it reads.
    fn parse(buf: &[u8]) -> Result<Self>
    where
        Self: Sized;

    /// Returns the container format this header belongs to.
    fn format(&self) -> Format;

    /// Returns the operating system the format implies.
    fn operating_system(&self) -> OperatingSystem;

    /// Returns the decoded CPU architecture.
    fn architecture(&self) -> Architecture;

    /// Returns the byte order of the header fields.
    fn endianness(&self) -> Endianness;
}

/// Borrows `width` bytes at `offset`, or reports which field did not fit.
pub(crate) fn field(buf: &[u8], format: Format, offset: usize, width: usize) -> Result<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or(IdentifyError::TruncatedHeader {
            format,
            offset,
            len: buf.len(),
        })
}
