use crate::error::Result;
use crate::format::Format;
use crate::header::elf::ElfIdent;
use crate::header::macho::MachHeader;
use crate::header::pe::PeHeader;
use crate::header::Header;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How many leading bytes [`identify_file`] reads.
pub const DEFAULT_READ_LIMIT: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Linux,
    Darwin,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    X86_64,
    Arm,
    Arm64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl OperatingSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Linux => "linux",
            OperatingSystem::Darwin => "darwin",
            OperatingSystem::Windows => "windows",
        }
    }
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X86_64 => "x86_64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl Endianness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endianness::Little => "little",
            Endianness::Big => "big",
        }
    }
}

impl std::str::FromStr for OperatingSystem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(OperatingSystem::Linux),
            "darwin" | "macos" => Ok(OperatingSystem::Darwin),
            "windows" => Ok(OperatingSystem::Windows),
            _ => Err(format!("Unknown operating system: {}", s)),
        }
    }
}

impl std::str::FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "i386" | "i686" => Ok(Architecture::X86),
            "x86_64" | "amd64" => Ok(Architecture::X86_64),
            "arm" => Ok(Architecture::Arm),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            _ => Err(format!("Unknown architecture: {}", s)),
        }
    }
}

impl std::str::FromStr for Endianness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "little" => Ok(Endianness::Little),
            "big" => Ok(Endianness::Big),
            _ => Err(format!("Unknown endianness: {}", s)),
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a binary is meant to run, as read from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryType {
    pub format: Format,
    pub operating_system: OperatingSystem,
    pub architecture: Architecture,
    pub endianness: Endianness,
}

impl BinaryType {
    fn from_header<H: Header>(header: &H) -> Self {
        Self {
            format: header.format(),
            operating_system: header.operating_system(),
            architecture: header.architecture(),
            endianness: header.endianness(),
        }
    }

    /// Reads the start of the file at `path` and classifies it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        identify_file(path)
    }
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({}-endian {})",
            self.operating_system, self.architecture, self.endianness, self.format
        )
    }
}

/// Classifies an in-memory binary from its header bytes.
///
/// `buf` must hold at least [`MIN_BUFFER_LEN`](crate::MIN_BUFFER_LEN) bytes;
/// PE files additionally need everything up to their `Machine` field.
/// The buffer is only read, and nothing is cached between calls.
pub fn identify(buf: &[u8]) -> Result<BinaryType> {
    let binary = match Format::sniff(buf)? {
        Format::Elf => BinaryType::from_header(&ElfIdent::parse(buf)?),
        Format::MachO => BinaryType::from_header(&MachHeader::parse(buf)?),
        Format::Pe => BinaryType::from_header(&PeHeader::parse(buf)?),
    };
    log::debug!("Identified {binary}");
    Ok(binary)
}

/// Reads up to `limit` bytes from the start of the file.
///
/// Short files are returned as-is; classification decides whether that is enough.
pub fn read_prefix<P: AsRef<Path>>(path: P, limit: u64) -> Result<Vec<u8>> {
    let file = File::open(&path)?;
    let mut buf = Vec::new();
    file.take(limit).read_to_end(&mut buf)?;
    log::debug!(
        "Read {} bytes from {}",
        buf.len(),
        path.as_ref().display()
    );
    Ok(buf)
}

pub fn identify_file<P: AsRef<Path>>(path: P) -> Result<BinaryType> {
    identify_file_with_limit(path, DEFAULT_READ_LIMIT)
}

pub fn identify_file_with_limit<P: AsRef<Path>>(path: P, limit: u64) -> Result<BinaryType> {
    let buf = read_prefix(&path, limit)?;
    let binary = identify(&buf)?;
    log::info!("{}: {binary}", path.as_ref().display());
    Ok(binary)
}
