//! Test doubles shared by the unit tests.

use crate::command::CommandRunner;
use crate::error::CommandError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A [`CommandRunner`] answering from a script keyed by directory and args.
///
/// Unscripted commands fail with exit status 1, the way `git` does for an
/// unknown remote or unset config key.
#[derive(Default)]
pub struct FakeRunner {
    script: HashMap<(PathBuf, String), Result<String, i32>>,
    calls: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful command.
    pub fn ok(mut self, dir: &Path, args: &str, stdout: &str) -> Self {
        self.script
            .insert((dir.to_path_buf(), args.to_string()), Ok(stdout.to_string()));
        self
    }

    /// Scripts a failing command.
    pub fn fail(mut self, dir: &Path, args: &str, code: i32) -> Self {
        self.script
            .insert((dir.to_path_buf(), args.to_string()), Err(code));
        self
    }

    /// Scripts the common case: a branch with `origin` pointing at `url`.
    pub fn repo(self, dir: &Path, branch: &str, url: &str) -> Self {
        self.ok(dir, "rev-parse --abbrev-ref HEAD", branch)
            .ok(dir, "remote get-url origin", url)
    }

    /// Every command issued so far, as `(dir, "arg arg ...")`.
    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, CommandError> {
        let line = args.join(" ");
        self.calls
            .lock()
            .unwrap()
            .push((dir.to_path_buf(), line.clone()));

        match self.script.get(&(dir.to_path_buf(), line.clone())) {
            Some(Ok(stdout)) => Ok(stdout.trim().to_string()),
            Some(Err(code)) => Err(CommandError::Failed {
                command: format!("git {line}"),
                code: Some(*code),
                stderr: "scripted failure".to_string(),
            }),
            None => Err(CommandError::Failed {
                command: format!("git {line}"),
                code: Some(1),
                stderr: String::new(),
            }),
        }
    }
}

/// Log output collected by [`capture_warnings`].
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` on this thread with a subscriber recording WARN and above.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer)
}
