use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    subwrap cache\n\n\
                  Remove all verified downloads:\n    subwrap cache clean")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// Delete the packagecache directory
    Clean,
}
