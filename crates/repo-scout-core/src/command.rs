//! Execution of external `git` commands.
//!
//! Arguments are always passed as an argument vector, never through a shell,
//! so branch and remote names taken from a repository cannot inject anything.

use crate::error::CommandError;
use std::path::Path;
use std::process::Command;

/// Runs one version-control command inside a working directory.
///
/// Implementations return the trimmed standard output. There are no retries;
/// callers decide what to do on failure.
pub trait CommandRunner: Send + Sync {
    /// Executes `args` in `dir` and returns trimmed stdout.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, CommandError>;
}

/// [`CommandRunner`] backed by the `git` binary on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    /// Creates a runner invoking `git`.
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Creates a runner invoking a specific executable instead of `git`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.program.clone();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for GitCli {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, CommandError> {
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(CommandError::Failed {
                command: self.command_line(args),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
