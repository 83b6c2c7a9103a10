//! External VCS process adapters
//!
//! Transports drive the `git`, `hg` and `svn` executables through thin
//! synchronous wrappers. A non-zero exit status is fatal for the resolve;
//! the error carries the rendered command line, the exit status and the
//! tool's stderr so failures are diagnosable without re-running.

pub mod git;
pub mod hg;
pub mod submodule;
pub mod svn;

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Result, WrapError};

fn render_command(program: &str, args: &[&str]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Run a command, failing only if it could not be started
fn run(program: &str, args: &[&str], cwd: &Path) -> Result<Output> {
    Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| WrapError::TransportCommandFailed {
            command: render_command(program, args),
            reason: format!("failed to start: {e}"),
        })
}

/// Run a command, treating a non-zero exit status as a fatal error
pub(crate) fn run_checked(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    let output = run(program, args, cwd)?;
    if output.status.success() {
        Ok(())
    } else {
        Err(WrapError::TransportCommandFailed {
            command: render_command(program, args),
            reason: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}

/// Run a command and report whether it succeeded; used where failure is an
/// expected branch rather than an error (e.g. the checkout-then-fetch
/// sequence)
pub(crate) fn run_status(program: &str, args: &[&str], cwd: &Path) -> Result<bool> {
    Ok(run(program, args, cwd)?.status.success())
}

/// Run a command swallowing all failures, returning success plus stdout.
/// A command that could not be started reads as a plain failure.
pub(crate) fn run_quiet(program: &str, args: &[&str], cwd: &Path) -> (bool, String) {
    match Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
    {
        Ok(output) => (
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ),
        Err(_) => (false, String::new()),
    }
}
