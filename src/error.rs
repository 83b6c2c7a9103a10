//! Error types for subwrap
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//! Every failure aborts the resolve for its package immediately; there is no
//! partial success and nothing is retried automatically.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for resolver operations
#[derive(Error, Diagnostic, Debug)]
pub enum WrapError {
    // Manifest errors
    #[error("Malformed wrap file {file}: {message}")]
    #[diagnostic(code(subwrap::manifest::malformed))]
    ManifestMalformed { file: String, message: String },

    #[error("Missing key '{key}' in {file}")]
    #[diagnostic(code(subwrap::manifest::key_missing))]
    ManifestKeyMissing { key: String, file: String },

    #[error("Unknown wrap type '{section}' in {file}")]
    #[diagnostic(
        code(subwrap::manifest::unknown_type),
        help("Supported section names: wrap-file, wrap-git, wrap-hg, wrap-svn")
    )]
    UnknownWrapType { section: String, file: String },

    #[error("Directory key must be a name and not a path: '{value}'")]
    #[diagnostic(
        code(subwrap::manifest::directory_invalid),
        help("The directory key selects a name under the subprojects root; it cannot contain path separators")
    )]
    DirectoryKeyInvalid { value: String },

    #[error("Failed to read wrap file {file}: {reason}")]
    #[diagnostic(code(subwrap::manifest::read_failed))]
    ManifestReadFailed { file: String, reason: String },

    // Download / cache errors
    #[error("Automatic downloading is disabled, cannot fetch '{package}'")]
    #[diagnostic(
        code(subwrap::download::disabled),
        help("Re-run without --nodownload, or provide the subproject sources manually")
    )]
    DownloadDisabled { package: String },

    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(
        code(subwrap::download::failed),
        help("Check that the URL is correct and the network is available")
    )]
    DownloadFailed { url: String, reason: String },

    #[error("Incorrect hash for {role}:\n {expected} expected\n {actual} actual")]
    #[diagnostic(
        code(subwrap::cache::integrity_mismatch),
        help("The downloaded or cached file does not match the hash declared in the wrap file")
    )]
    IntegrityMismatch {
        role: String,
        expected: String,
        actual: String,
    },

    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(subwrap::cache::operation_failed))]
    CacheOperationFailed { message: String },

    // Transport errors
    #[error("Command '{command}' failed: {reason}")]
    #[diagnostic(code(subwrap::transport::command_failed))]
    TransportCommandFailed { command: String, reason: String },

    #[error("Unsupported archive format: {filename}")]
    #[diagnostic(
        code(subwrap::transport::unsupported_archive),
        help("Supported formats: .tar, .tar.gz, .tgz, .tar.bz2, .tbz2, .tar.xz, .txz, .zip")
    )]
    UnsupportedArchive { filename: String },

    #[error("Failed to extract {filename}: {reason}")]
    #[diagnostic(code(subwrap::transport::extract_failed))]
    ExtractFailed { filename: String, reason: String },

    // Submodule errors
    #[error("git submodule '{path}' has merge conflicts")]
    #[diagnostic(
        code(subwrap::submodule::conflict),
        help("Resolve the submodule conflict in the enclosing repository first")
    )]
    SubmoduleConflict { path: String },

    #[error("git submodule '{path}' failed to init")]
    #[diagnostic(code(subwrap::submodule::init_failed))]
    SubmoduleInitFailed { path: String },

    #[error("Unknown git submodule status output: {output:?}")]
    #[diagnostic(code(subwrap::submodule::unknown_state))]
    SubmoduleStateUnknown { output: String },

    // Orchestrator errors
    #[error("Subproject directory not found and {package}.wrap file not found")]
    #[diagnostic(
        code(subwrap::resolve::not_found),
        help("Provide a {package}.wrap manifest or vendor the sources under the subprojects root")
    )]
    NotFound { package: String },

    #[error("Subproject '{directory}' exists but has no {descriptor} file")]
    #[diagnostic(code(subwrap::resolve::postcondition_failed))]
    PostconditionFailed {
        directory: String,
        descriptor: &'static str,
    },

    #[error("Path '{path}' already exists but is not a directory")]
    #[diagnostic(code(subwrap::resolve::target_not_directory))]
    TargetNotDirectory { path: String },

    #[error("Subprojects root not found: {path}")]
    #[diagnostic(
        code(subwrap::resolve::root_not_found),
        help("Pass --root or set SUBWRAP_ROOT to the subprojects directory")
    )]
    RootNotFound { path: String },

    // Ambient file system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(subwrap::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for WrapError {
    fn from(err: std::io::Error) -> Self {
        WrapError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, WrapError>;
