use thiserror::Error;

use crate::format::Format;

/// Why a buffer could not be classified.
///
/// Every variant is terminal: the identifier never retries and never returns a
/// partial result alongside an error. Callers match on the variant to decide
/// what to do next, e.g. fetch more bytes on [`IdentifyError::BufferTooSmall`]
/// or give up on [`IdentifyError::UnsupportedArchitecture`].
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Not enough bytes to even attempt format sniffing.
    #[error("binary too small: got {len} bytes, need at least {required}")]
    BufferTooSmall { len: usize, required: usize },

    /// No known magic prefix matched.
    #[error("unknown binary format (leading bytes {magic:02x?})")]
    UnrecognizedFormat { magic: [u8; 4] },

    /// The format was recognized but a required field lies past the end of the buffer.
    #[error("truncated {format} header: field at offset {offset:#x} is beyond {len} bytes")]
    TruncatedHeader {
        format: Format,
        offset: usize,
        len: usize,
    },

    /// Structurally valid header with a machine code outside the supported set.
    #[error("unsupported {format} architecture: {value:#x}")]
    UnsupportedArchitecture { format: Format, value: u32 },

    /// ELF `EI_DATA` byte other than 1 (little) or 2 (big).
    #[error("unsupported ELF data encoding: {value:#x}")]
    UnsupportedEndianness { value: u8 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with something other than 200 or 206.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
}

pub type Result<T> = std::result::Result<T, IdentifyError>;
