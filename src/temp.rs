//! Safe temporary directory base so scratch dirs are never created under the
//! current working directory (e.g. when TMPDIR=tmp or TMPDIR=./tmp).

use std::env;
use std::path::PathBuf;

/// Returns an absolute directory path suitable for creating scratch
/// directories in, so a relative TMPDIR never lands them inside the repo.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }
}
