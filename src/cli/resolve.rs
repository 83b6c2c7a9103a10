use clap::Parser;

use crate::resolver::BuildMethod;

/// Arguments for the resolve command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Resolve for a meson-style build:\n    subwrap resolve zlib\n\n\
                   Resolve several subprojects:\n    subwrap resolve zlib libpng sqlite\n\n\
                   Offline resolve (cache and vendored trees only):\n    subwrap resolve zlib --nodownload")]
pub struct ResolveArgs {
    /// Package names to resolve (each names a <package>.wrap manifest or a
    /// pre-vendored directory under the subprojects root)
    #[arg(required = true, num_args = 1..)]
    pub packages: Vec<String>,

    /// Build method whose descriptor file the resolved tree must contain
    #[arg(long, short = 'm', value_enum, default_value_t = BuildMethod::Meson)]
    pub method: BuildMethod,

    /// Forbid network and VCS fetches; fail instead of downloading
    #[arg(long)]
    pub nodownload: bool,

    /// Whole-transfer download timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 600)]
    pub timeout_secs: u64,

    /// Allow one warned fallback to unencrypted HTTP when TLS fails
    #[arg(long)]
    pub allow_insecure: bool,
}
