//! Content cache for downloaded archives and patches
//!
//! Files live under `<root>/packagecache/<declared filename>` and are only
//! ever trusted after their SHA-256 digest has been recomputed and compared
//! against the hash the current manifest declares for that role. A stale
//! file with a matching name but the wrong digest is rejected, never
//! silently reused.
//!
//! Downloads stream into a temporary file in the cache directory and are
//! renamed into place only after the full digest matches, so a cache entry
//! is never partially visible under its final name.

pub mod download;

use std::fmt;
use std::path::{Path, PathBuf};

use console::style;

use crate::diagnostics::Diagnostics;
use crate::error::{Result, WrapError};
use crate::hash;
use crate::manifest::PackageDefinition;

pub use download::DownloadOptions;

/// Name of the cache directory under the subprojects root
pub const CACHE_DIR_NAME: &str = "packagecache";

/// Whether network fetches may be attempted at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPolicy {
    Allowed,
    Forbidden,
}

/// Which of the manifest's file roles is being fetched.
///
/// The manifest declares `<role>_url`, `<role>_filename` and `<role>_hash`
/// keys per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Patch,
}

impl Role {
    fn key(self, suffix: &str) -> String {
        format!("{self}_{suffix}")
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => f.write_str("source"),
            Role::Patch => f.write_str("patch"),
        }
    }
}

/// Hash-verified local store avoiding repeat downloads
pub struct ContentCache {
    dir: PathBuf,
    policy: DownloadPolicy,
    options: DownloadOptions,
}

impl ContentCache {
    /// Create a cache rooted at `<root>/packagecache`. The directory itself
    /// is created lazily, on first download.
    pub fn new(root: &Path, policy: DownloadPolicy, options: DownloadOptions) -> Self {
        Self {
            dir: root.join(CACHE_DIR_NAME),
            policy,
            options,
        }
    }

    /// Return a verified local copy of the manifest's file for `role`,
    /// downloading it first if it is not already cached.
    pub fn fetch(
        &self,
        role: Role,
        wrap: &PackageDefinition,
        diagnostics: &mut Diagnostics,
    ) -> Result<PathBuf> {
        let filename = wrap.get(&role.key("filename"))?;
        let expected = wrap.get(&role.key("hash"))?;
        let cache_path = self.dir.join(filename);

        if cache_path.exists() {
            self.verify(role, expected, &cache_path)?;
            println!(
                "Using {} {} from cache.",
                style(&wrap.name).bold(),
                role
            );
            return Ok(cache_path);
        }

        if self.policy == DownloadPolicy::Forbidden {
            return Err(WrapError::DownloadDisabled {
                package: wrap.name.clone(),
            });
        }

        let url = wrap.get(&role.key("url"))?;
        std::fs::create_dir_all(&self.dir).map_err(|e| WrapError::CacheOperationFailed {
            message: format!("failed to create {}: {}", self.dir.display(), e),
        })?;

        println!(
            "Downloading {} {} from {}",
            style(&wrap.name).bold(),
            role,
            style(url).bold()
        );
        download::download_verified(url, expected, &cache_path, role, &self.options, diagnostics)?;
        Ok(cache_path)
    }

    fn verify(&self, role: Role, expected: &str, path: &Path) -> Result<()> {
        let actual = hash::hash_file(path)?;
        if !hash::digests_match(expected, &actual) {
            return Err(WrapError::IntegrityMismatch {
                role: role.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    fn sha256_hex(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    fn file_wrap(temp: &TempDir, body: &str) -> PackageDefinition {
        let wrap_path = temp.path().join("foo.wrap");
        std::fs::write(&wrap_path, body).unwrap();
        PackageDefinition::load(&wrap_path).unwrap()
    }

    fn cache(temp: &TempDir, policy: DownloadPolicy) -> ContentCache {
        ContentCache::new(temp.path(), policy, DownloadOptions::default())
    }

    #[test]
    fn test_cache_hit_verifies_and_returns_without_network() {
        let temp = TempDir::new().unwrap();
        let payload = b"fixture bytes";
        let cache_dir = temp.path().join(CACHE_DIR_NAME);
        std::fs::create_dir_all(&cache_dir).unwrap();
        std::fs::write(cache_dir.join("foo.tar.gz"), payload).unwrap();

        let wrap = file_wrap(
            &temp,
            &format!(
                "[wrap-file]\n\
                 source_filename = foo.tar.gz\n\
                 source_hash = {}\n",
                sha256_hex(payload)
            ),
        );

        // No source_url declared and policy forbids downloads: a hit must
        // still succeed purely from the cache.
        let cache = cache(&temp, DownloadPolicy::Forbidden);
        let mut diagnostics = Diagnostics::new();
        let path = cache.fetch(Role::Source, &wrap, &mut diagnostics).unwrap();
        assert_eq!(path, cache_dir.join("foo.tar.gz"));
    }

    #[test]
    fn test_corrupted_cache_entry_is_rejected() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join(CACHE_DIR_NAME);
        std::fs::create_dir_all(&cache_dir).unwrap();
        std::fs::write(cache_dir.join("foo.tar.gz"), b"tampered").unwrap();

        let wrap = file_wrap(
            &temp,
            &format!(
                "[wrap-file]\n\
                 source_filename = foo.tar.gz\n\
                 source_hash = {}\n",
                sha256_hex(b"original")
            ),
        );

        let cache = cache(&temp, DownloadPolicy::Allowed);
        let mut diagnostics = Diagnostics::new();
        let err = cache
            .fetch(Role::Source, &wrap, &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, WrapError::IntegrityMismatch { .. }));
    }

    #[test]
    fn test_download_disabled_when_not_cached() {
        let temp = TempDir::new().unwrap();
        let wrap = file_wrap(
            &temp,
            "[wrap-file]\n\
             source_filename = foo.tar.gz\n\
             source_hash = 0000\n\
             source_url = http://host/foo.tar.gz\n",
        );

        let cache = cache(&temp, DownloadPolicy::Forbidden);
        let mut diagnostics = Diagnostics::new();
        let err = cache
            .fetch(Role::Source, &wrap, &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, WrapError::DownloadDisabled { .. }));
    }

    #[test]
    fn test_download_from_file_url_and_atomic_commit() {
        let temp = TempDir::new().unwrap();
        let payload = b"archive payload";
        let source = temp.path().join("origin.tar.gz");
        std::fs::write(&source, payload).unwrap();

        let wrap = file_wrap(
            &temp,
            &format!(
                "[wrap-file]\n\
                 source_filename = foo.tar.gz\n\
                 source_hash = {}\n\
                 source_url = file://{}\n",
                sha256_hex(payload),
                source.display()
            ),
        );

        let cache = cache(&temp, DownloadPolicy::Allowed);
        let mut diagnostics = Diagnostics::new();
        let path = cache.fetch(Role::Source, &wrap, &mut diagnostics).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), payload);

        // No temp leftovers next to the final name
        let names: Vec<_> = std::fs::read_dir(temp.path().join(CACHE_DIR_NAME))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["foo.tar.gz".to_string()]);
    }

    #[test]
    fn test_download_integrity_mismatch_leaves_no_cache_entry() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("origin.tar.gz");
        std::fs::write(&source, b"actual bytes").unwrap();

        let wrap = file_wrap(
            &temp,
            &format!(
                "[wrap-file]\n\
                 source_filename = foo.tar.gz\n\
                 source_hash = {}\n\
                 source_url = file://{}\n",
                sha256_hex(b"declared other bytes"),
                source.display()
            ),
        );

        let cache = cache(&temp, DownloadPolicy::Allowed);
        let mut diagnostics = Diagnostics::new();
        let err = cache
            .fetch(Role::Source, &wrap, &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, WrapError::IntegrityMismatch { .. }));
        assert!(!temp.path().join(CACHE_DIR_NAME).join("foo.tar.gz").exists());
    }
}
