//! Wrap manifest parsing
//!
//! A wrap file is a small INI-style manifest naming one external dependency's
//! fetch method and location:
//!
//! ```text
//! [wrap-git]
//! url = https://example.org/repo.git
//! revision = v1.2.3
//! ```
//!
//! Parsing validates the structure eagerly (exactly one section, recognized
//! `wrap-` kind) and produces a typed [`PackageDefinition`]. Individual keys
//! are looked up lazily because not every key is required for every
//! operation; a missing key fails at first access, naming the key and the
//! manifest file.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, WrapError};

/// Fetch method of a wrap manifest, parsed from its section name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapKind {
    /// `[wrap-file]`: download + extract an archive, optionally patched
    File,
    /// `[wrap-git]`: clone/fetch/checkout through the git CLI
    Git,
    /// `[wrap-hg]`: clone + checkout through the hg CLI
    Hg,
    /// `[wrap-svn]`: checkout at a revision through the svn CLI
    Svn,
}

impl WrapKind {
    fn from_section(section: &str, file: &str) -> Result<Self> {
        let Some(kind) = section.strip_prefix("wrap-") else {
            return Err(WrapError::ManifestMalformed {
                file: file.to_string(),
                message: format!("'{section}' is not a valid first section"),
            });
        };
        match kind {
            "file" => Ok(WrapKind::File),
            "git" => Ok(WrapKind::Git),
            "hg" => Ok(WrapKind::Hg),
            "svn" => Ok(WrapKind::Svn),
            _ => Err(WrapError::UnknownWrapType {
                section: section.to_string(),
                file: file.to_string(),
            }),
        }
    }
}

/// One parsed wrap manifest. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct PackageDefinition {
    /// Package name derived from the file's base name (`zlib.wrap` -> `zlib`);
    /// used as the default target directory name
    pub name: String,
    /// Base name of the manifest file, used in error messages
    pub basename: String,
    /// Fetch method, from the single `[wrap-*]` section
    pub kind: WrapKind,
    values: BTreeMap<String, String>,
}

impl PackageDefinition {
    /// Load and validate a wrap manifest from disk
    pub fn load(path: &Path) -> Result<Self> {
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let name = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| basename.clone());

        let content =
            std::fs::read_to_string(path).map_err(|e| WrapError::ManifestReadFailed {
                file: basename.clone(),
                reason: e.to_string(),
            })?;

        Self::parse(&content, name, basename)
    }

    /// Parse manifest text. Exactly one `[wrap-*]` section is required.
    fn parse(content: &str, name: String, basename: String) -> Result<Self> {
        let mut section: Option<String> = None;
        let mut values = BTreeMap::new();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let Some(header) = header.strip_suffix(']') else {
                    return Err(WrapError::ManifestMalformed {
                        file: basename,
                        message: format!("unterminated section header on line {}", lineno + 1),
                    });
                };
                if section.is_some() {
                    return Err(WrapError::ManifestMalformed {
                        file: basename,
                        message: format!(
                            "expected exactly one section, found another: '{}'",
                            header.trim()
                        ),
                    });
                }
                section = Some(header.trim().to_string());
                continue;
            }

            if section.is_none() {
                return Err(WrapError::ManifestMalformed {
                    file: basename,
                    message: format!("key outside of any section on line {}", lineno + 1),
                });
            }

            // Key/value pairs may strip inline comments only at line level;
            // values keep everything after the first '='.
            let Some((key, value)) = line.split_once('=') else {
                return Err(WrapError::ManifestMalformed {
                    file: basename,
                    message: format!("expected 'key = value' on line {}", lineno + 1),
                });
            };
            let key = key.trim().to_ascii_lowercase();
            if values.contains_key(&key) {
                return Err(WrapError::ManifestMalformed {
                    file: basename,
                    message: format!("duplicate key '{}' on line {}", key, lineno + 1),
                });
            }
            values.insert(key, value.trim().to_string());
        }

        let Some(section) = section else {
            return Err(WrapError::ManifestMalformed {
                file: basename,
                message: "missing sections".to_string(),
            });
        };
        let kind = WrapKind::from_section(&section, &basename)?;

        Ok(Self {
            name,
            basename,
            kind,
            values,
        })
    }

    /// Look up a required key, failing with the key and manifest name
    pub fn get(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| WrapError::ManifestKeyMissing {
                key: key.to_string(),
                file: self.basename.clone(),
            })
    }

    /// Look up an optional key
    pub fn get_optional(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether the key is present at all (value may be empty)
    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether a patch overlay is declared for this package
    pub fn has_patch(&self) -> bool {
        self.values.contains_key("patch_url")
    }

    /// The validated `directory` override, if declared.
    ///
    /// The value must be a bare name: anything resembling a path would let a
    /// manifest escape the subprojects root.
    pub fn directory(&self) -> Result<Option<&str>> {
        match self.values.get("directory") {
            None => Ok(None),
            Some(value) if is_bare_name(value) => Ok(Some(value)),
            Some(value) => Err(WrapError::DirectoryKeyInvalid {
                value: value.clone(),
            }),
        }
    }
}

fn is_bare_name(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', ':'])
}
