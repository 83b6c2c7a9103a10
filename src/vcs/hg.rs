//! Mercurial transport backend

use std::path::Path;

use super::run_checked;
use crate::error::Result;
use crate::manifest::PackageDefinition;

pub fn fetch(wrap: &PackageDefinition, root: &Path, directory: &str) -> Result<()> {
    let url = wrap.get("url")?;
    let revision = wrap.get("revision")?;

    run_checked("hg", &["clone", url, directory], root)?;
    if !revision.eq_ignore_ascii_case("tip") {
        run_checked("hg", &["checkout", revision], &root.join(directory))?;
    }
    Ok(())
}
