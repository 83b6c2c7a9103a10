//! SHA-256 hashing utilities for download integrity

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, WrapError};

/// Calculate the SHA-256 digest of a file, returned as lowercase hex
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| WrapError::CacheOperationFailed {
        message: format!("failed to open {}: {}", path.display(), e),
    })?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| WrapError::CacheOperationFailed {
                message: format!("failed to read {}: {}", path.display(), e),
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare a computed digest against a declared one, case-insensitively
pub fn digests_match(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}
