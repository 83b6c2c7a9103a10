//! Streaming download adapter
//!
//! Issues synchronous HTTP(S) GETs with one whole-transfer timeout, hashing
//! the stream incrementally so a mismatched digest is detected before the
//! file becomes visible under its final cache name. `file://` URLs are
//! served straight from the local filesystem, which keeps tests and offline
//! mirrors off the network entirely.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use super::Role;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, WrapError};
use crate::hash;
use crate::progress::DownloadProgress;

const BLOCK_SIZE: usize = 8192;

/// Tunables for one resolver invocation's downloads
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Wall-clock timeout for a whole transfer, not per chunk
    pub timeout: Duration,
    /// Whether a failed TLS connection may fall back to plain HTTP once,
    /// with a warning. Off by default; this retries unauthenticated.
    pub allow_insecure: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            allow_insecure: false,
        }
    }
}

/// Stream `url` into `dest`, verifying the SHA-256 digest along the way.
///
/// The bytes land in a temporary file next to `dest` and are renamed into
/// place only after the digest matches `expected`; on mismatch the temp
/// file is deleted and an integrity error reports both digests.
pub fn download_verified(
    url: &str,
    expected: &str,
    dest: &Path,
    role: Role,
    options: &DownloadOptions,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| WrapError::CacheOperationFailed {
        message: format!("failed to create temporary file in {}: {}", parent.display(), e),
    })?;

    let (mut reader, total) = open_stream(url, options, diagnostics)?;
    let progress = DownloadProgress::new(total);

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BLOCK_SIZE];
    loop {
        let n = reader.read(&mut buffer).map_err(|e| {
            progress.finish();
            WrapError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        tmp.write_all(&buffer[..n])
            .map_err(|e| WrapError::CacheOperationFailed {
                message: format!("failed to write download to disk: {e}"),
            })?;
        progress.advance(n as u64);
    }
    progress.finish();

    let actual = hex::encode(hasher.finalize());
    if !hash::digests_match(expected, &actual) {
        // NamedTempFile removes itself on drop, so the bad bytes never
        // appear under the final cache name.
        return Err(WrapError::IntegrityMismatch {
            role: role.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }

    tmp.persist(dest).map_err(|e| WrapError::CacheOperationFailed {
        message: format!("failed to move download into cache: {e}"),
    })?;
    Ok(())
}

/// A readable byte stream plus its total length, when known
type Stream = (Box<dyn Read>, Option<u64>);

fn open_stream(
    url: &str,
    options: &DownloadOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Stream> {
    if let Some(path) = url.strip_prefix("file://") {
        return open_local(url, Path::new(path));
    }

    match open_http(url, options) {
        Ok(stream) => Ok(stream),
        Err(failure) => {
            // The fallback to unencrypted HTTP is opt-in and warned about;
            // it retries the same host without transport authentication.
            // Only connection-level failures qualify: a status response
            // means the server was reached and would answer the same way.
            if options.allow_insecure && fallback_applies(&failure) {
                if let Some(rest) = url.strip_prefix("https://") {
                    diagnostics.warn_once(
                        "insecure-fallback",
                        "TLS connection failed, falling back to unencrypted HTTP",
                    );
                    let insecure = format!("http://{rest}");
                    return open_http(&insecure, options)
                        .map_err(|f| f.into_error(&insecure));
                }
            }
            Err(failure.into_error(url))
        }
    }
}

/// An HTTP request failure, split by whether the server was reached
#[derive(Debug)]
enum HttpFailure {
    /// The server answered with a non-success status
    Status(u16),
    /// TLS or connection failure before any response
    Transport(String),
}

impl HttpFailure {
    fn into_error(self, url: &str) -> WrapError {
        match self {
            HttpFailure::Status(code) => WrapError::DownloadFailed {
                url: url.to_string(),
                reason: format!("server returned status {code}"),
            },
            HttpFailure::Transport(reason) => WrapError::DownloadFailed {
                url: url.to_string(),
                reason,
            },
        }
    }
}

fn fallback_applies(failure: &HttpFailure) -> bool {
    matches!(failure, HttpFailure::Transport(_))
}

fn open_local(url: &str, path: &Path) -> Result<Stream> {
    let file = File::open(path).map_err(|e| WrapError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let len = file.metadata().ok().map(|m| m.len());
    Ok((Box::new(file), len))
}

fn open_http(url: &str, options: &DownloadOptions) -> std::result::Result<Stream, HttpFailure> {
    let agent = ureq::AgentBuilder::new().timeout(options.timeout).build();
    match agent.get(url).call() {
        Ok(response) => {
            let total = response
                .header("Content-Length")
                .and_then(|v| v.parse::<u64>().ok());
            Ok((Box::new(response.into_reader()), total))
        }
        Err(ureq::Error::Status(code, _)) => Err(HttpFailure::Status(code)),
        Err(ureq::Error::Transport(transport)) => {
            Err(HttpFailure::Transport(transport.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub fn local_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_download_verified_from_local_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("payload.bin");
        std::fs::write(&source, b"hello world").unwrap();
        let dest = temp.path().join("cache").join("payload.bin");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();

        let expected = hex::encode(Sha256::digest(b"hello world"));
        let mut diagnostics = Diagnostics::new();
        download_verified(
            &local_url(&source),
            &expected,
            &dest,
            Role::Source,
            &DownloadOptions::default(),
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
    }

    #[test]
    fn test_missing_local_file_is_download_failed() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.bin");
        let mut diagnostics = Diagnostics::new();
        let err = download_verified(
            "file:///nonexistent/path/payload.bin",
            "00",
            &dest,
            Role::Source,
            &DownloadOptions::default(),
            &mut diagnostics,
        )
        .unwrap_err();
        assert!(matches!(err, WrapError::DownloadFailed { .. }));
    }

    #[test]
    fn test_fallback_only_applies_to_transport_failures() {
        assert!(fallback_applies(&HttpFailure::Transport(
            "tls handshake failed".to_string()
        )));
        // A status response reached the server; retrying over plain HTTP
        // would just repeat the same answer unauthenticated.
        assert!(!fallback_applies(&HttpFailure::Status(404)));
        assert!(!fallback_applies(&HttpFailure::Status(500)));
    }

    #[test]
    fn test_http_failure_messages() {
        let err = HttpFailure::Status(404).into_error("https://host/foo.tar.gz");
        assert!(err.to_string().contains("server returned status 404"));

        let err = HttpFailure::Transport("connection refused".to_string())
            .into_error("https://host/foo.tar.gz");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_mismatch_removes_temp_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("payload.bin");
        std::fs::write(&source, b"real bytes").unwrap();
        let cache_dir = temp.path().join("cache");
        std::fs::create_dir_all(&cache_dir).unwrap();
        let dest = cache_dir.join("payload.bin");

        let mut diagnostics = Diagnostics::new();
        let err = download_verified(
            &local_url(&source),
            &hex::encode(Sha256::digest(b"declared bytes")),
            &dest,
            Role::Source,
            &DownloadOptions::default(),
            &mut diagnostics,
        )
        .unwrap_err();
        assert!(matches!(err, WrapError::IntegrityMismatch { .. }));
        assert_eq!(std::fs::read_dir(&cache_dir).unwrap().count(), 0);
    }
}
