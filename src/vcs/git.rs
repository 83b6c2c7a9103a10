//! Git transport backend
//!
//! Three distinct clone strategies, selected from the manifest's `depth`
//! and `revision` keys:
//!
//! - depth requested and the revision is a full commit id: a shallow clone
//!   cannot target an arbitrary commit, so init an empty repository, add
//!   the remote, shallow-fetch exactly that commit and check it out.
//! - no depth: full clone, then checkout the revision unless it is the
//!   symbolic `head`; a checkout of a ref not fetched by default is retried
//!   once after an explicit fetch of that ref (a protocol necessity, not
//!   error recovery).
//! - depth with a branch/tag name: shallow clone directly at that ref.
//!
//! All strategies then honor `clone-recursive` and `push-url`.

use std::path::Path;

use super::{run_checked, run_status};
use crate::error::Result;
use crate::manifest::PackageDefinition;

pub fn fetch(wrap: &PackageDefinition, root: &Path, directory: &str) -> Result<()> {
    let dirname = root.join(directory);
    let url = wrap.get("url")?;
    let revision = wrap.get("revision")?;
    let depth = wrap.get_optional("depth").filter(|d| !d.is_empty());

    match depth {
        Some(depth) if is_full_commit_id(revision) => {
            fetch_shallow_commit(url, revision, depth, root, directory, &dirname)?;
        }
        None => {
            clone_full(url, revision, root, directory, &dirname)?;
        }
        Some(depth) => {
            run_checked(
                "git",
                &["clone", "--depth", depth, "--branch", revision, url, directory],
                root,
            )?;
        }
    }

    if wrap
        .get_optional("clone-recursive")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        let mut args = vec!["submodule", "update", "--init", "--checkout", "--recursive"];
        if let Some(depth) = depth {
            args.push("--depth");
            args.push(depth);
        }
        run_checked("git", &args, &dirname)?;
    }

    if let Some(push_url) = wrap.get_optional("push-url").filter(|u| !u.is_empty()) {
        run_checked(
            "git",
            &["remote", "set-url", "--push", "origin", push_url],
            &dirname,
        )?;
    }

    Ok(())
}

/// Shallow-fetch an arbitrary commit: init + remote add + fetch + checkout.
/// `git clone --depth` only accepts branch or tag names, never a raw SHA.
fn fetch_shallow_commit(
    url: &str,
    revision: &str,
    depth: &str,
    root: &Path,
    directory: &str,
    dirname: &Path,
) -> Result<()> {
    run_checked("git", &["init", directory], root)?;
    run_checked("git", &["remote", "add", "origin", url], dirname)?;
    run_checked(
        "git",
        &["fetch", "--depth", depth, "origin", revision],
        dirname,
    )?;
    run_checked("git", &["checkout", revision], dirname)?;
    Ok(())
}

fn clone_full(
    url: &str,
    revision: &str,
    root: &Path,
    directory: &str,
    dirname: &Path,
) -> Result<()> {
    run_checked("git", &["clone", url, directory], root)?;
    if !revision.eq_ignore_ascii_case("head") {
        // Remote branches are not always fetched by default; retry the
        // checkout once after fetching the ref explicitly.
        if !run_status("git", &["checkout", revision], dirname)? {
            run_checked("git", &["fetch", url, revision], dirname)?;
            run_checked("git", &["checkout", revision], dirname)?;
        }
    }
    Ok(())
}

/// Whether the revision is a full commit identifier: 40 hex chars for
/// SHA-1, 64 for SHA-256 object names
pub(crate) fn is_full_commit_id(revision: &str) -> bool {
    matches!(revision.len(), 40 | 64) && revision.chars().all(|c| c.is_ascii_hexdigit())
}
