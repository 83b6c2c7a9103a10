//! Archive extraction and patch overlay
//!
//! Source archives extract into the subprojects root (or into the target
//! directory when the package lacks its own leading directory). Patch
//! archives overlay an extracted tree: direct extraction is attempted
//! first, and when the archive's layout defeats that, it is unpacked into
//! a scratch directory and copied file-by-file over the target, clearing
//! read-only bits so stale files can be replaced.

use std::fs::File;
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use walkdir::WalkDir;
use xz2::read::XzDecoder;

use crate::error::{Result, WrapError};

/// Extract `archive` into `dest`, dispatching on the file extension
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let filename = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let open = || {
        File::open(archive).map_err(|e| WrapError::ExtractFailed {
            filename: filename.clone(),
            reason: e.to_string(),
        })
    };
    let extract_err = |e: std::io::Error| WrapError::ExtractFailed {
        filename: filename.clone(),
        reason: e.to_string(),
    };

    if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
        tar::Archive::new(GzDecoder::new(open()?))
            .unpack(dest)
            .map_err(extract_err)
    } else if filename.ends_with(".tar.bz2") || filename.ends_with(".tbz2") {
        tar::Archive::new(BzDecoder::new(open()?))
            .unpack(dest)
            .map_err(extract_err)
    } else if filename.ends_with(".tar.xz") || filename.ends_with(".txz") {
        tar::Archive::new(XzDecoder::new(open()?))
            .unpack(dest)
            .map_err(extract_err)
    } else if filename.ends_with(".tar") {
        tar::Archive::new(open()?).unpack(dest).map_err(extract_err)
    } else if filename.ends_with(".zip") {
        let mut zip = zip::ZipArchive::new(open()?).map_err(|e| WrapError::ExtractFailed {
            filename: filename.clone(),
            reason: e.to_string(),
        })?;
        zip.extract(dest).map_err(|e| WrapError::ExtractFailed {
            filename: filename.clone(),
            reason: e.to_string(),
        })
    } else {
        Err(WrapError::UnsupportedArchive { filename })
    }
}

/// Copy a directory tree over `dst_root`, overwriting read-only files.
///
/// Used as the patch fallback when an archive cannot be extracted directly
/// over the target tree.
pub fn overlay(src_root: &Path, dst_root: &Path) -> Result<()> {
    for entry in WalkDir::new(src_root) {
        let entry = entry.map_err(|e| WrapError::IoError {
            message: format!("failed to walk {}: {}", src_root.display(), e),
        })?;
        let rel = entry
            .path()
            .strip_prefix(src_root)
            .map_err(|e| WrapError::IoError {
                message: e.to_string(),
            })?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dst_root.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if target.exists() {
                remove_force(&target)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove a file, clearing the read-only bit first if the plain remove is
/// refused.
fn remove_force(path: &Path) -> Result<()> {
    if std::fs::remove_file(path).is_ok() {
        return Ok(());
    }
    let mut perms = std::fs::metadata(path)?.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    std::fs::set_permissions(path, perms)?;
    std::fs::remove_file(path)?;
    Ok(())
}
