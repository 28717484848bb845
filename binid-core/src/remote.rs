use std::io::Read;

use crate::binary::{identify, BinaryType, DEFAULT_READ_LIMIT};
use crate::error::{IdentifyError, Result};

/// True for `http://` and `https://` locations.
pub fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Downloads at most `limit` leading bytes of `url` with a ranged GET.
///
/// A `206 Partial Content` answer is the normal case. Servers that ignore
/// `Range` answer `200 OK` with the whole body; only the first `limit` bytes
/// of it are read and the connection is dropped. A body shorter than `limit`
/// is returned as-is in both cases. Any other status is an error.
pub fn read_url_prefix(url: &str, limit: u64) -> Result<Vec<u8>> {
    let range = format!("bytes=0-{}", limit.saturating_sub(1));
    let response = match ureq::get(url).set("Range", &range).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, _)) => {
            return Err(IdentifyError::HttpStatus {
                url: url.to_string(),
                status,
            })
        }
        Err(ureq::Error::Transport(source)) => {
            return Err(IdentifyError::Transport {
                url: url.to_string(),
                source: Box::new(source),
            })
        }
    };

    match response.status() {
        206 => {}
        200 => log::debug!("{url} ignored the Range header, reading the first {limit} bytes"),
        status => {
            return Err(IdentifyError::HttpStatus {
                url: url.to_string(),
                status,
            })
        }
    }

    let mut buf = Vec::new();
    response.into_reader().take(limit).read_to_end(&mut buf)?;
    log::debug!("Read {} bytes from {url}", buf.len());
    Ok(buf)
}

pub fn identify_url(url: &str) -> Result<BinaryType> {
    identify_url_with_limit(url, DEFAULT_READ_LIMIT)
}

pub fn identify_url_with_limit(url: &str, limit: u64) -> Result<BinaryType> {
    let buf = read_url_prefix(url, limit)?;
    let binary = identify(&buf)?;
    log::info!("{url}: {binary}");
    Ok(binary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_http_schemes() {
        assert!(is_url("http://example.com/tool"));
        assert!(is_url("HTTPS://example.com/tool.exe"));
        assert!(!is_url("ftp://example.com/tool"));
        assert!(!is_url("./http/tool"));
    }
}
