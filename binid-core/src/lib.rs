pub mod binary;
pub mod error;
pub mod format;
pub mod header;
pub mod remote;

pub use binary::*;
pub use error::{IdentifyError, Result};
pub use format::{Format, MIN_BUFFER_LEN};
pub use remote::{identify_url, identify_url_with_limit, is_url, read_url_prefix};
