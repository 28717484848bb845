use crate::binary::{Architecture, Endianness, OperatingSystem};
use crate::error::{IdentifyError, Result};
use crate::format::Format;
use crate::header::{field, Header};

/// Offset of `EI_DATA` inside `e_ident`.
pub const EI_DATA: usize = 4;

/// Offset of `e_machine`, right after the 16-byte `e_ident` and the 2-byte `e_type`.
pub const E_MACHINE: usize = 18;

pub const ELFDATA2LSB: u8 = 1;
pub const ELFDATA2MSB: u8 = 2;

/// `e_machine` codes we classify, keyed by the byte stored at [`E_MACHINE`].
pub const ELF_MACHINES: [(u8, Architecture); 4] = [
    (0x03, Architecture::X86),    // EM_386
    (0x3e, Architecture::X86_64), // EM_X86_64
    (0xb7, Architecture::Arm64),  // EM_AARCH64
    (0x28, Architecture::Arm),    // EM_ARM
];

/// The two pieces of the ELF identification we need to classify a file.
///
/// ELF headers start with the 16-byte `e_ident` array (`0x7F 'E' 'L' 'F'`
/// followed by class, data encoding and version), then `e_type` and
/// `e_machine`.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[derive(Debug, Clone, Copy)]
pub struct ElfIdent {
    /// Data encoding byte (`EI_DATA`).
    ///
    /// - `ELFDATA2LSB` (1): two's complement, little-endian
    /// - `ELFDATA2MSB` (2): two's complement, big-endian
    ///
    /// Any other value is rejected, although some loaders treat it as
    /// little-endian. That fallback is non-standard and not copied here.
    pub ei_data: u8,

    /// Byte at offset 18, the first byte of the 16-bit `e_machine` field.
    ///
    /// For little-endian files this is the low byte. For the machines we
    /// support the high byte is always zero, so one byte is enough. Big-endian
    /// files store the high byte here and are only classified when that byte
    /// happens to match.
    pub e_machine: u8,

    architecture: Architecture,
    endianness: Endianness,
}

impl Header for ElfIdent {
    fn parse(buf: &[u8]) -> Result<ElfIdent> {
        let e_machine = field(buf, Format::Elf, E_MACHINE, 1)?[0];
        let architecture = ELF_MACHINES
            .iter()
            .find(|(code, _)| *code == e_machine)
            .map(|(_, arch)| *arch)
            .ok_or(IdentifyError::UnsupportedArchitecture {
                format: Format::Elf,
                value: u32::from(e_machine),
            })?;

        let ei_data = field(buf, Format::Elf, EI_DATA, 1)?[0];
        let endianness = match ei_data {
            ELFDATA2LSB => Endianness::Little,
            ELFDATA2MSB => Endianness::Big,
            value => return Err(IdentifyError::UnsupportedEndianness { value }),
        };

        log::debug!("ELF e_machine={e_machine:#x} ei_data={ei_data}");
        Ok(ElfIdent {
            ei_data,
            e_machine,
            architecture,
            endianness,
        })
    }

    fn format(&self) -> Format {
        Format::Elf
    }

    fn operating_system(&self) -> OperatingSystem {
        // Other ELF systems (FreeBSD, Solaris, ...) are not told apart.
        OperatingSystem::Linux
    }

    fn architecture(&self) -> Architecture {
        self.architecture
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elf(ei_data: u8, e_machine: u8) -> Vec<u8> {
        let mut buf = vec![0u8; 64];
        buf[..4].copy_from_slice(b"\x7fELF");
        buf[EI_DATA] = ei_data;
        buf[E_MACHINE] = e_machine;
        buf
    }

    #[test]
    fn decodes_every_supported_machine() {
        for (ei_data, endianness) in [
            (ELFDATA2LSB, Endianness::Little),
            (ELFDATA2MSB, Endianness::Big),
        ] {
            for (code, arch) in ELF_MACHINES {
                let hdr = ElfIdent::parse(&elf(ei_data, code)).unwrap();
                assert_eq!(hdr.architecture(), arch);
                assert_eq!(hdr.endianness(), endianness);
                assert_eq!(hdr.operating_system(), OperatingSystem::Linux);
            }
        }
    }

    #[test]
    fn big_endian_data_encoding() {
        let hdr = ElfIdent::parse(&elf(ELFDATA2MSB, 0x28)).unwrap();
        assert_eq!(hdr.architecture(), Architecture::Arm);
        assert_eq!(hdr.endianness(), Endianness::Big);
    }

    #[test]
    fn unknown_machine_is_unsupported() {
        let err = ElfIdent::parse(&elf(ELFDATA2LSB, 0xff)).unwrap_err();
        assert!(matches!(
            err,
            IdentifyError::UnsupportedArchitecture {
                format: Format::Elf,
                value: 0xff
            }
        ));
    }

    #[test]
    fn invalid_data_encoding_is_rejected() {
        for value in [0u8, 3, 0xff] {
            let err = ElfIdent::parse(&elf(value, 0x3e)).unwrap_err();
            assert!(matches!(err, IdentifyError::UnsupportedEndianness { value: v } if v == value));
        }
    }

    #[test]
    fn machine_is_checked_before_data_encoding() {
        let err = ElfIdent::parse(&elf(0, 0xff)).unwrap_err();
        assert!(matches!(err, IdentifyError::UnsupportedArchitecture { .. }));
    }
}
