/*!
 * Single-file text reading with size and binary-content guards
 */

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::utils::{excessive_nul_bytes, latin1_to_string};

/// Default per-file ceiling for viewing content
pub const DEFAULT_MAX_VIEW_SIZE: u64 = 5 * 1024 * 1024;

/// Read a file's text content with the default size ceiling.
pub fn read_file_content(path: &Path) -> Result<String> {
    read_file_content_with_limit(path, DEFAULT_MAX_VIEW_SIZE)
}

/// Read a file's text content, failing with `TooLarge` beyond `max_size`.
///
/// Decoding tries UTF-8 first; content containing NUL characters is treated
/// as binary. On invalid UTF-8 a latin1 fallback is attempted, rejected only
/// when more than 10% of the bytes are NUL. The fallback text may be
/// visually imperfect but remains viewable.
pub fn read_file_content_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| Error::from_io(e, path))?;

    if metadata.is_dir() {
        return Err(Error::IsADirectory(path.to_path_buf()));
    }
    if metadata.len() > max_size {
        return Err(Error::TooLarge {
            path: path.to_path_buf(),
            actual: metadata.len(),
            max: max_size,
        });
    }
    if metadata.len() == 0 {
        return Ok(String::new());
    }

    let bytes = fs::read(path).map_err(|e| Error::from_io(e, path))?;
    decode_text(bytes, path)
}

/// Decode file bytes with the UTF-8 then latin1 fallback policy.
pub(crate) fn decode_text(bytes: Vec<u8>, path: &Path) -> Result<String> {
    match String::from_utf8(bytes) {
        Ok(text) => {
            if text.contains('\0') {
                return Err(Error::BinaryContent(path.to_path_buf()));
            }
            Ok(text)
        }
        Err(err) => {
            warn!(path = %path.display(), "not valid UTF-8, falling back to latin1");
            let bytes = err.into_bytes();
            if excessive_nul_bytes(&bytes) {
                return Err(Error::BinaryContent(path.to_path_buf()));
            }
            Ok(latin1_to_string(&bytes))
        }
    }
}
