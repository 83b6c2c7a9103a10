//! Subversion transport backend
//!
//! Subversion addresses revisions at checkout time, so there is no separate
//! clone + checkout split.

use std::path::Path;

use super::run_checked;
use crate::error::Result;
use crate::manifest::PackageDefinition;

pub fn fetch(wrap: &PackageDefinition, root: &Path, directory: &str) -> Result<()> {
    let url = wrap.get("url")?;
    let revision = wrap.get("revision")?;

    run_checked("svn", &["checkout", "-r", revision, url, directory], root)
}
