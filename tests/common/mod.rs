//! Common test utilities for subwrap integration tests

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

/// A subprojects root in a temporary directory
pub struct TestRoot {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// The subprojects root passed to --root
    pub root: PathBuf,
}

impl TestRoot {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("subprojects");
        std::fs::create_dir_all(&root).expect("Failed to create subprojects root");
        Self { temp, root }
    }

    /// Write a wrap manifest under the root
    pub fn write_wrap(&self, name: &str, content: &str) {
        std::fs::write(self.root.join(format!("{name}.wrap")), content)
            .expect("Failed to write wrap file");
    }

    /// Path of a file under the root
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// An invocation of the subwrap binary pointed at this root
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("subwrap").expect("binary exists");
        cmd.arg("--root").arg(&self.root);
        cmd
    }
}

/// Build a .tar.gz at `dest` holding the given (path, contents) entries
pub fn make_tar_gz(dest: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(dest).expect("create archive");
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .expect("append entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
        .flush()
        .expect("flush archive");
}

/// Lowercase hex SHA-256 of a file's bytes
pub fn sha256_hex(path: &Path) -> String {
    let bytes = std::fs::read(path).expect("read file for hashing");
    hex::encode(Sha256::digest(&bytes))
}

/// A wrap-file manifest fetching `archive` over a file:// URL
pub fn file_wrap(archive: &Path, extra: &str) -> String {
    format!(
        "[wrap-file]\n\
         source_url = file://{}\n\
         source_filename = {}\n\
         source_hash = {}\n\
         {}",
        archive.display(),
        archive.file_name().expect("file name").to_string_lossy(),
        sha256_hex(archive),
        extra
    )
}

/// Run git with a throwaway identity, panicking on failure
#[allow(dead_code)]
pub fn git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-c")
        .arg("user.name=test")
        .arg("-c")
        .arg("user.email=test@example.com")
        .arg("-c")
        .arg("protocol.file.allow=always")
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
