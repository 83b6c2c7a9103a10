//! Resolve command implementation

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DownloadOptions, DownloadPolicy};
use crate::cli::ResolveArgs;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::resolver::Resolver;

/// Resolve each named package and print its directory name
pub fn run(root: Option<PathBuf>, args: ResolveArgs) -> Result<()> {
    let root = super::subprojects_root(root)?;
    let policy = if args.nodownload {
        DownloadPolicy::Forbidden
    } else {
        DownloadPolicy::Allowed
    };
    let options = DownloadOptions {
        timeout: Duration::from_secs(args.timeout_secs),
        allow_insecure: args.allow_insecure,
    };

    let mut resolver = Resolver::new(root, policy, options, Diagnostics::new());
    for package in &args.packages {
        let directory = resolver.resolve(package, args.method)?;
        println!("{directory}");
    }
    Ok(())
}
