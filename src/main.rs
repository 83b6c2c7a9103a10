//! Subwrap - subproject dependency resolver
//!
//! Materializes external source dependencies described by wrap manifests
//! into verified, ready-to-build source trees under a subprojects root,
//! over archive, git, hg or svn transports.

use clap::Parser;

mod archive;
mod cache;
mod cli;
mod commands;
mod diagnostics;
mod error;
mod hash;
mod manifest;
mod progress;
mod resolver;
mod temp;
mod vcs;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::run(cli.root, args),
        Commands::Cache(args) => commands::cache::run(cli.root, args),
        Commands::Completions(args) => commands::completions::run(args),
        Commands::Version => commands::version::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
