use std::fmt;

use crate::error::{IdentifyError, Result};
use crate::header::macho::MACH_MAGICS;

/// Smallest buffer the identifier will look at.
///
/// Covers the deepest fixed offset any decoder reads. PE headers are located
/// through `e_lfanew` and may need more; that is checked by the PE decoder.
pub const MIN_BUFFER_LEN: usize = 64;

pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
pub const PE_MAGIC: [u8; 2] = [b'M', b'Z'];

/// Executable container formats the identifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Elf,
    MachO,
    Pe,
}

impl Format {
    /// Works out the container format from the leading magic bytes.
    ///
    /// Prefixes are tried in the order ELF, Mach-O, PE. They cannot overlap,
    /// so the order only matters for readability.
    pub fn sniff(buf: &[u8]) -> Result<Format> {
        if buf.len() < MIN_BUFFER_LEN {
            return Err(IdentifyError::BufferTooSmall {
                len: buf.len(),
                required: MIN_BUFFER_LEN,
            });
        }

        let format = if buf.starts_with(&ELF_MAGIC) {
            Format::Elf
        } else if MACH_MAGICS
            .iter()
            .any(|m| buf.starts_with(&m.magic.to_be_bytes()))
        {
            Format::MachO
        } else if buf.starts_with(&PE_MAGIC) {
            Format::Pe
        } else {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&buf[..4]);
            return Err(IdentifyError::UnrecognizedFormat { magic });
        };

        log::trace!("sniffed {format} from {} bytes", buf.len());
        Ok(format)
    }

    /// Short lower-case name, e.g. for machine-readable output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Elf => "elf",
            Format::MachO => "macho",
            Format::Pe => "pe",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Elf => "ELF",
            Format::MachO => "Mach-O",
            Format::Pe => "PE",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(prefix: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; MIN_BUFFER_LEN];
        buf[..prefix.len()].copy_from_slice(prefix);
        buf
    }

    #[test]
    fn sniffs_each_magic() {
        assert_eq!(Format::sniff(&padded(b"\x7fELF")).unwrap(), Format::Elf);
        assert_eq!(Format::sniff(&padded(b"MZ")).unwrap(), Format::Pe);
        for magic in [
            [0xfe, 0xed, 0xfa, 0xce],
            [0xfe, 0xed, 0xfa, 0xcf],
            [0xce, 0xfa, 0xed, 0xfe],
            [0xcf, 0xfa, 0xed, 0xfe],
        ] {
            assert_eq!(Format::sniff(&padded(&magic)).unwrap(), Format::MachO);
        }
    }

    #[test]
    fn fat_magic_is_not_macho() {
        let err = Format::sniff(&padded(&[0xca, 0xfe, 0xba, 0xbe])).unwrap_err();
        assert!(matches!(
            err,
            IdentifyError::UnrecognizedFormat {
                magic: [0xca, 0xfe, 0xba, 0xbe]
            }
        ));
    }

    #[test]
    fn short_buffer_is_rejected_before_magic_check() {
        let err = Format::sniff(b"\x7fELF").unwrap_err();
        assert!(matches!(
            err,
            IdentifyError::BufferTooSmall {
                len: 4,
                required: MIN_BUFFER_LEN
            }
        ));
    }

    #[test]
    fn exactly_minimum_length_is_accepted() {
        let buf = padded(b"MZ");
        assert_eq!(buf.len(), MIN_BUFFER_LEN);
        assert!(Format::sniff(&buf).is_ok());
    }
}
