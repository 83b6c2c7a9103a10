//! Git submodule reconciliation for subproject paths
//!
//! When the subprojects root lives inside a version-controlled repository,
//! the target path may be a submodule in any of several half-initialized
//! states. The first character of `git submodule status` output decides
//! what to do; each marker maps to exactly one action.

use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::error::{Result, WrapError};
use crate::vcs::{run_quiet, run_status};

/// Classified `git submodule status` output for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleState {
    /// Empty output: the path is just a directory in the main repository
    NotASubmodule,
    /// `+`: checked out at a different commit than recorded
    OutOfDate,
    /// `U`: merge conflict in the submodule pointer
    Conflict,
    /// `-`: registered but not initialized/populated
    Uninitialized,
    /// ` `: recorded and in sync, but the working tree may be empty
    Clean,
}

/// Map status output to a state; an unrecognized marker is surfaced
/// verbatim as an error
pub fn classify(output: &str) -> Result<SubmoduleState> {
    match output.chars().next() {
        None => Ok(SubmoduleState::NotASubmodule),
        Some('+') => Ok(SubmoduleState::OutOfDate),
        Some('U') => Ok(SubmoduleState::Conflict),
        Some('-') => Ok(SubmoduleState::Uninitialized),
        Some(' ') => Ok(SubmoduleState::Clean),
        Some(_) => Err(WrapError::SubmoduleStateUnknown {
            output: output.to_string(),
        }),
    }
}

/// Detect whether `dirname` is a submodule of the repository enclosing
/// `root` and drive it into a usable state.
///
/// Best-effort overall: returns `Ok(true)` when submodule machinery
/// (possibly) populated the path, `Ok(false)` when the path has no
/// submodule relationship at all. Only a merge conflict or a failed init
/// aborts the resolve.
pub fn reconcile(root: &Path, dirname: &Path, diagnostics: &Diagnostics) -> Result<bool> {
    // No VCS context at all -> nothing to reconcile
    if git2::Repository::discover(root).is_err() {
        return Ok(false);
    }

    let dirname_str = dirname.to_string_lossy();
    let (ok, output) = run_quiet("git", &["submodule", "status", &dirname_str], root);
    if !ok {
        return Ok(false);
    }

    match classify(&output)? {
        SubmoduleState::NotASubmodule => Ok(false),
        SubmoduleState::OutOfDate => {
            diagnostics.warn("git submodule might be out of date");
            Ok(true)
        }
        SubmoduleState::Conflict => Err(WrapError::SubmoduleConflict {
            path: dirname_str.into_owned(),
        }),
        SubmoduleState::Uninitialized => {
            if run_status("git", &["submodule", "update", "--init", &dirname_str], root)? {
                Ok(true)
            } else {
                Err(WrapError::SubmoduleInitFailed {
                    path: dirname_str.into_owned(),
                })
            }
        }
        SubmoduleState::Clean => {
            // The pointer is fine but the working tree may never have been
            // populated. Force a checkout and tolerate failure; the build
            // will surface anything actually wrong.
            let _ = run_status("git", &["checkout", "."], dirname);
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_all_documented_markers() {
        assert_eq!(classify("").unwrap(), SubmoduleState::NotASubmodule);
        assert_eq!(
            classify("+9f21... sub (heads/main)").unwrap(),
            SubmoduleState::OutOfDate
        );
        assert_eq!(
            classify("U9f21... sub").unwrap(),
            SubmoduleState::Conflict
        );
        assert_eq!(
            classify("-9f21... sub").unwrap(),
            SubmoduleState::Uninitialized
        );
        assert_eq!(
            classify(" 9f21... sub (v1.0)").unwrap(),
            SubmoduleState::Clean
        );
    }

    #[test]
    fn test_classify_unknown_marker_surfaced_verbatim() {
        let err = classify("?something odd").unwrap_err();
        match err {
            WrapError::SubmoduleStateUnknown { output } => {
                assert_eq!(output, "?something odd");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
