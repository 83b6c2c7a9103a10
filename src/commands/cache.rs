//! Cache command implementation

use std::path::PathBuf;

use crate::cache::CACHE_DIR_NAME;
use crate::cli::{CacheArgs, CacheSubcommand};
use crate::error::{Result, WrapError};

pub fn run(root: Option<PathBuf>, args: CacheArgs) -> Result<()> {
    let cache_dir = super::subprojects_root(root)?.join(CACHE_DIR_NAME);

    match args.command {
        Some(CacheSubcommand::Clean) => clean(&cache_dir),
        None => stats(&cache_dir),
    }
}

fn clean(cache_dir: &std::path::Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache is empty.");
        return Ok(());
    }
    std::fs::remove_dir_all(cache_dir).map_err(|e| WrapError::CacheOperationFailed {
        message: format!("failed to remove {}: {}", cache_dir.display(), e),
    })?;
    println!("Removed {}", cache_dir.display());
    Ok(())
}

fn stats(cache_dir: &std::path::Path) -> Result<()> {
    println!("Cache location: {}", cache_dir.display());

    let mut files = 0u64;
    let mut bytes = 0u64;
    if cache_dir.is_dir() {
        for entry in std::fs::read_dir(cache_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files += 1;
                bytes += entry.metadata()?.len();
            }
        }
    }

    println!("  Files: {files}");
    println!("  Size: {}", format_size(bytes));
    if files == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'subwrap cache clean' to remove everything from the cache.");
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
