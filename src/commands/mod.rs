//! Command implementations, one module per CLI subcommand

pub mod cache;
pub mod completions;
pub mod resolve;
pub mod version;

use std::path::PathBuf;

use crate::error::{Result, WrapError};

/// Default subprojects root relative to the working directory
const DEFAULT_ROOT: &str = "subprojects";

/// Resolve the subprojects root from the global flag or the default,
/// requiring it to exist
pub(crate) fn subprojects_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = root.unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
    if root.is_dir() {
        Ok(root)
    } else {
        Err(WrapError::RootNotFound {
            path: root.display().to_string(),
        })
    }
}
