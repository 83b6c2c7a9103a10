//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - resolve: Resolve command arguments
//! - cache: Cache command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod cache;
pub mod completions;
pub mod resolve;

pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;
pub use resolve::ResolveArgs;

/// Subwrap - subproject dependency resolver
#[derive(Parser, Debug)]
#[command(
    name = "subwrap",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Subproject dependency resolver for wrap manifests",
    long_about = "Subwrap materializes external source dependencies described by wrap \
                  manifests into verified, ready-to-build source trees under a \
                  subprojects root, over archive, git, hg or svn transports.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  subwrap resolve zlib                  \x1b[90m# Resolve one subproject\x1b[0m\n   \
                  subwrap resolve zlib --method cmake   \x1b[90m# Require CMakeLists.txt instead\x1b[0m\n   \
                  subwrap resolve zlib --nodownload     \x1b[90m# Fail rather than touch the network\x1b[0m\n   \
                  subwrap cache clean                   \x1b[90m# Drop the packagecache directory\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Subprojects root directory (defaults to ./subprojects)
    #[arg(long, short = 'r', global = true, env = "SUBWRAP_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve subprojects into ready-to-build source trees
    Resolve(ResolveArgs),

    /// Manage the download cache
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    #[command(hide = true)]
    Version,
}
