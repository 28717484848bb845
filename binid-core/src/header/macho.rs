use crate::binary::{Architecture, Endianness, OperatingSystem};
use crate::error::{IdentifyError, Result};
use crate::format::Format;
use crate::header::{field, Header};
use byteorder::{ByteOrder, BE, LE};

pub const MH_MAGIC: u32 = 0xfeed_face;
pub const MH_MAGIC_64: u32 = 0xfeed_facf;
pub const MH_CIGAM: u32 = 0xcefa_edfe;
pub const MH_CIGAM_64: u32 = 0xcffa_edfe;

/// How to read the rest of a header that starts with `magic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachMagic {
    /// Magic number as read big-endian from the first four bytes.
    pub magic: u32,
    /// Byte order of every field after the magic.
    pub byte_order: Endianness,
    /// Where the signed 32-bit `cputype` is read from.
    pub cputype_offset: usize,
}

/// Byte order and `cputype` location both derive from the magic, so they live
/// in one row. The byte-swapped forms read `cputype` at offset 8.
pub const MACH_MAGICS: [MachMagic; 4] = [
    MachMagic {
        magic: MH_MAGIC,
        byte_order: Endianness::Big,
        cputype_offset: 4,
    },
    MachMagic {
        magic: MH_MAGIC_64,
        byte_order: Endianness::Big,
        cputype_offset: 4,
    },
    MachMagic {
        magic: MH_CIGAM,
        byte_order: Endianness::Little,
        cputype_offset: 8,
    },
    MachMagic {
        magic: MH_CIGAM_64,
        byte_order: Endianness::Little,
        cputype_offset: 8,
    },
];

/// `cputype` values we classify.
///
/// `0x03000000`, `0x0100000D` and `0` are not CPU types from
/// `<mach/machine.h>`. They are kept for compatibility with existing callers:
/// `0` in particular is reported as arm64 and should not be read as meaningful.
pub const CPU_TYPES: [(i32, Architecture); 7] = [
    (7, Architecture::X86),              // CPU_TYPE_X86
    (0x0100_0007, Architecture::X86_64), // CPU_TYPE_X86_64
    (0x0300_0000, Architecture::X86_64),
    (12, Architecture::Arm),             // CPU_TYPE_ARM
    (0x0100_000c, Architecture::Arm64),  // CPU_TYPE_ARM64
    (0x0100_000d, Architecture::Arm64),
    (0, Architecture::Arm64),
];

#[derive(Debug, Clone, Copy)]
pub struct MachHeader {
    pub magic: MachMagic,
    pub cputype: i32,
    architecture: Architecture,
}

impl Header for MachHeader {
    fn parse(buf: &[u8]) -> Result<MachHeader> {
        let raw = BE::read_u32(field(buf, Format::MachO, 0, 4)?);
        // Only reachable through the sniffer, which already matched one of these.
        let magic = *MACH_MAGICS
            .iter()
            .find(|m| m.magic == raw)
            .ok_or(IdentifyError::UnrecognizedFormat {
                magic: raw.to_be_bytes(),
            })?;

        let bytes = field(buf, Format::MachO, magic.cputype_offset, 4)?;
        let cputype = match magic.byte_order {
            Endianness::Big => BE::read_i32(bytes),
            Endianness::Little => LE::read_i32(bytes),
        };
        log::debug!(
            "Mach-O magic={:#010x} cputype={cputype:#x} at offset {}",
            magic.magic, magic.cputype_offset
        );

        let architecture = CPU_TYPES
            .iter()
            .find(|(code, _)| *code == cputype)
            .map(|(_, arch)| *arch)
            .ok_or(IdentifyError::UnsupportedArchitecture {
                format: Format::MachO,
                value: cputype as u32,
            })?;

        Ok(MachHeader {
            magic,
            cputype,
            architecture,
        })
    }

    fn format(&self) -> Format {
        Format::MachO
    }

    fn operating_system(&self) -> OperatingSystem {
        OperatingSystem::Darwin
    }

    fn architecture(&self) -> Architecture {
        self.architecture
    }

    fn endianness(&self) -> Endianness {
        self.magic.byte_order
    }
}
