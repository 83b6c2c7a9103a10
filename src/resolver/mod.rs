//! Resolver orchestrator
//!
//! Ties the manifest parser, submodule reconciler, transport backends and
//! content cache together for one package:
//!
//! 1. Load `<name>.wrap` if present (absence is legal for pre-vendored
//!    trees) and apply its validated `directory` override.
//! 2. Reconcile submodule state (best-effort; a pointer merge conflict is
//!    the one state that always aborts).
//! 3. If the target already holds the requested build descriptor, the
//!    resolve is satisfied and no transport runs (idempotence).
//! 4. Otherwise dispatch the transport matching the manifest's kind, then
//!    re-check the descriptor postcondition.
//!
//! The only externally observable output is the resolved directory's name
//! relative to the subprojects root.

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::archive;
use crate::cache::{ContentCache, DownloadOptions, DownloadPolicy, Role};
use crate::diagnostics::Diagnostics;
use crate::error::{Result, WrapError};
use crate::manifest::{PackageDefinition, WrapKind};
use crate::temp;
use crate::vcs;

/// Selects which build-descriptor file marks a directory as a usable
/// source tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildMethod {
    Meson,
    Cmake,
}

impl BuildMethod {
    /// The file that must exist in the resolved directory
    pub fn descriptor(self) -> &'static str {
        match self {
            BuildMethod::Meson => "meson.build",
            BuildMethod::Cmake => "CMakeLists.txt",
        }
    }
}

/// Per-invocation resolver over one subprojects root
pub struct Resolver {
    root: PathBuf,
    policy: DownloadPolicy,
    cache: ContentCache,
    diagnostics: Diagnostics,
}

impl Resolver {
    pub fn new(
        root: PathBuf,
        policy: DownloadPolicy,
        options: DownloadOptions,
        diagnostics: Diagnostics,
    ) -> Self {
        let cache = ContentCache::new(&root, policy, options);
        Self {
            root,
            policy,
            cache,
            diagnostics,
        }
    }

    /// Resolve one package, returning the directory name under the
    /// subprojects root that now contains the requested build descriptor
    pub fn resolve(&mut self, package: &str, method: BuildMethod) -> Result<String> {
        let wrap = self.load_wrap(package)?;

        // The wrap file may override the default target directory name
        let mut directory = package.to_string();
        if let Some(wrap) = &wrap {
            if let Some(name) = wrap.directory()? {
                directory = name.to_string();
            }
        }
        let dirname = self.root.join(&directory);
        let descriptor = dirname.join(method.descriptor());

        // A conflicted submodule pointer aborts even an otherwise
        // satisfied directory; everything else here is best-effort.
        vcs::submodule::reconcile(&self.root, &dirname, &self.diagnostics)?;

        // Already usable? Nothing to fetch.
        if descriptor.exists() {
            return Ok(directory);
        }

        if dirname.exists() {
            if !dirname.is_dir() {
                return Err(WrapError::TargetNotDirectory {
                    path: dirname.display().to_string(),
                });
            }
            // An existing directory without the descriptor is not fetched
            // over; the postcondition check below reports it.
        } else {
            // Only a wrap file can materialize a missing directory
            let Some(wrap) = &wrap else {
                return Err(WrapError::NotFound {
                    package: package.to_string(),
                });
            };
            match wrap.kind {
                WrapKind::File => self.fetch_archive(wrap, &dirname)?,
                WrapKind::Git => {
                    self.check_can_download(package)?;
                    vcs::git::fetch(wrap, &self.root, &directory)?;
                }
                WrapKind::Hg => {
                    self.check_can_download(package)?;
                    vcs::hg::fetch(wrap, &self.root, &directory)?;
                }
                WrapKind::Svn => {
                    self.check_can_download(package)?;
                    vcs::svn::fetch(wrap, &self.root, &directory)?;
                }
            }
        }

        // Distinguishes "something was fetched but is not buildable by the
        // requested method" from "nothing was fetched" above
        if !descriptor.exists() {
            return Err(WrapError::PostconditionFailed {
                directory,
                descriptor: method.descriptor(),
            });
        }

        Ok(directory)
    }

    fn load_wrap(&self, package: &str) -> Result<Option<PackageDefinition>> {
        let path = self.root.join(format!("{package}.wrap"));
        if path.is_file() {
            Ok(Some(PackageDefinition::load(&path)?))
        } else {
            Ok(None)
        }
    }

    fn check_can_download(&self, package: &str) -> Result<()> {
        if self.policy == DownloadPolicy::Forbidden {
            return Err(WrapError::DownloadDisabled {
                package: package.to_string(),
            });
        }
        Ok(())
    }

    /// Archive transport: fetch through the content cache, extract, then
    /// apply the optional patch overlay
    fn fetch_archive(&mut self, wrap: &PackageDefinition, dirname: &Path) -> Result<()> {
        let path = self.cache.fetch(Role::Source, wrap, &mut self.diagnostics)?;

        // Some upstreams ship archives without a leading directory; create
        // the target and extract into it instead of the root.
        let extract_root = if wrap.has_key("lead_directory_missing") {
            std::fs::create_dir_all(dirname)?;
            dirname.to_path_buf()
        } else {
            self.root.clone()
        };
        archive::extract(&path, &extract_root)?;

        if wrap.has_patch() {
            self.apply_patch(wrap)?;
        }
        Ok(())
    }

    /// Overlay the patch archive onto the extracted tree. Direct
    /// extraction is tried first; archives whose layout defeats it are
    /// unpacked to a scratch directory and copied over file by file.
    fn apply_patch(&mut self, wrap: &PackageDefinition) -> Result<()> {
        let path = self.cache.fetch(Role::Patch, wrap, &mut self.diagnostics)?;
        if archive::extract(&path, &self.root).is_err() {
            let scratch =
                tempfile::tempdir_in(temp::temp_dir_base()).map_err(|e| WrapError::IoError {
                    message: format!("failed to create scratch directory: {e}"),
                })?;
            archive::extract(&path, scratch.path())?;
            archive::overlay(scratch.path(), &self.root)?;
        }
        Ok(())
    }
}
