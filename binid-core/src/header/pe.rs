use crate::binary::{Architecture, Endianness, OperatingSystem};
use crate::error::{IdentifyError, Result};
use crate::format::Format;
use crate::header::{field, Header};
use byteorder::{ByteOrder, LE};

/// Offset of `e_lfanew` in the MS-DOS stub header.
pub const E_LFANEW: usize = 0x3c;

/// `Machine` sits after the 4-byte `PE\0\0` signature.
pub const MACHINE_OFFSET: usize = 4;

pub const PE_MACHINES: [(u16, Architecture); 3] = [
    (0x014c, Architecture::X86),    // IMAGE_FILE_MACHINE_I386
    (0x8664, Architecture::X86_64), // IMAGE_FILE_MACHINE_AMD64
    (0xaa64, Architecture::Arm64),  // IMAGE_FILE_MACHINE_ARM64
];

/// DOS stub pointer plus the COFF `Machine` field it leads to.
#[derive(Debug, Clone, Copy)]
pub struct PeHeader {
    /// File offset of the `PE\0\0` signature.
    pub e_lfanew: u32,
    pub machine: u16,
    architecture: Architecture,
}

impl Header for PeHeader {
    fn parse(buf: &[u8]) -> Result<PeHeader> {
        let e_lfanew = LE::read_u32(field(buf, Format::Pe, E_LFANEW, 4)?);

        // e_lfanew is untrusted and may point past the buffer.
        let machine_at = usize::try_from(e_lfanew)
            .ok()
            .and_then(|off| off.checked_add(MACHINE_OFFSET))
            .ok_or(IdentifyError::TruncatedHeader {
                format: Format::Pe,
                offset: usize::MAX,
                len: buf.len(),
            })?;
        let machine = LE::read_u16(field(buf, Format::Pe, machine_at, 2)?);
        log::debug!("PE e_lfanew={e_lfanew:#x} machine={machine:#06x}");

        let architecture = PE_MACHINES
            .iter()
            .find(|(code, _)| *code == machine)
            .map(|(_, arch)| *arch)
            .ok_or(IdentifyError::UnsupportedArchitecture {
                format: Format::Pe,
                value: u32::from(machine),
            })?;

        Ok(PeHeader {
            e_lfanew,
            machine,
            architecture,
        })
    }

    fn format(&self) -> Format {
        Format::Pe
    }

    fn operating_system(&self) -> OperatingSystem {
        OperatingSystem::Windows
    }

    fn architecture(&self) -> Architecture {
        self.architecture
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pe(e_lfanew: u32, machine: u16, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        buf[..2].copy_from_slice(b"MZ");
        LE::write_u32(&mut buf[E_LFANEW..E_LFANEW + 4], e_lfanew);
        let at = e_lfanew as usize + MACHINE_OFFSET;
        if at + 2 <= len {
            LE::write_u16(&mut buf[at..at + 2], machine);
        }
        buf
    }

    #[test]
    fn machine_is_read_through_e_lfanew() {
        let hdr = PeHeader::parse(&pe(0x80, 0x8664, 0x100)).unwrap();
        assert_eq!(hdr.e_lfanew, 0x80);
        assert_eq!(hdr.machine, 0x8664);
        assert_eq!(hdr.architecture(), Architecture::X86_64);
        assert_eq!(hdr.endianness(), Endianness::Little);
        assert_eq!(hdr.operating_system(), OperatingSystem::Windows);
    }

    #[test]
    fn decodes_every_supported_machine() {
        for (machine, arch) in PE_MACHINES {
            let hdr = PeHeader::parse(&pe(0x40, machine, 0x80)).unwrap();
            assert_eq!(hdr.architecture(), arch);
        }
    }

    #[test]
    fn arm32_machine_is_unsupported() {
        let err = PeHeader::parse(&pe(0x40, 0x01c4, 0x80)).unwrap_err();
        assert!(matches!(
            err,
            IdentifyError::UnsupportedArchitecture {
                format: Format::Pe,
                value: 0x1c4
            }
        ));
    }

    #[test]
    fn machine_field_must_fit_entirely() {
        // e_lfanew + 6 == len is the tightest fit that still works.
        assert!(PeHeader::parse(&pe(0x8a, 0x014c, 0x90)).is_ok());

        let err = PeHeader::parse(&pe(0x8b, 0x014c, 0x90)).unwrap_err();
        assert!(matches!(
            err,
            IdentifyError::TruncatedHeader {
                format: Format::Pe,
                offset: 0x8f,
                len: 0x90
            }
        ));
    }

    #[test]
    fn huge_e_lfanew_is_truncated() {
        let err = PeHeader::parse(&pe(u32::MAX, 0, 0x40)).unwrap_err();
        assert!(matches!(err, IdentifyError::TruncatedHeader { .. }));
    }
}
