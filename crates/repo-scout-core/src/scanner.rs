//! Recursive discovery of repositories below a root directory.
//!
//! The walker visits every directory not excluded by the ignore set, checks
//! it for a `.git` marker, and keeps descending whether or not a repository
//! was found, so nested clones are reported too. Nothing that goes wrong at a
//! single directory stops the walk: unreadable subtrees and repositories
//! without a remote become [`ScanIssue`]s.

use crate::classifier::classify;
use crate::collector::collect_repo_info;
use crate::command::CommandRunner;
use crate::models::{IssueKind, ProviderRepos, ScanIssue};
use crate::registry::HostRegistry;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// File or directory whose presence marks a repository.
///
/// A file also counts, which covers worktrees and submodules.
pub const MARKER: &str = ".git";

/// Traversal limits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum depth below the root; `None` means unlimited.
    pub max_depth: Option<usize>,

    /// Whether to descend through symbolic links.
    pub follow_symlinks: bool,
}

/// Everything one walk produced.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// Descriptors per provider, in traversal order.
    pub found: ProviderRepos,

    /// Directories carrying a marker.
    pub repositories_found: usize,

    /// Repositories recorded under a provider.
    pub classified: usize,

    /// Repositories whose URL matched no provider.
    pub unclassified: usize,

    /// Skipped directories and repositories.
    pub issues: Vec<ScanIssue>,

    /// Whether the walk stopped on a cancellation request.
    pub cancelled: bool,
}

/// Walks a directory tree against a registry snapshot.
///
/// # Example
///
/// ```no_run
/// use repo_scout_core::command::GitCli;
/// use repo_scout_core::registry::HostRegistry;
/// use repo_scout_core::scanner::TreeWalker;
/// use std::path::Path;
///
/// let registry = HostRegistry::with_defaults()?;
/// let runner = GitCli::new();
/// let outcome = TreeWalker::new(&registry, &runner).walk(Path::new("/srv/plugins"));
/// println!("{} repositories classified", outcome.classified);
/// # Ok::<(), repo_scout_core::Error>(())
/// ```
pub struct TreeWalker<'a> {
    registry: &'a HostRegistry,
    runner: &'a dyn CommandRunner,
    options: WalkOptions,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker with unlimited depth that does not follow symlinks.
    pub fn new(registry: &'a HostRegistry, runner: &'a dyn CommandRunner) -> Self {
        Self {
            registry,
            runner,
            options: WalkOptions::default(),
            cancel: None,
        }
    }

    /// Sets traversal limits.
    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks `flag` before each directory and stops once it is set.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Walks `root` and returns what was found.
    ///
    /// The root itself is always visited, even if its name is ignored.
    pub fn walk(&self, root: &Path) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        for name in self.registry.provider_names() {
            outcome.found.ensure(&name);
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name();
        if let Some(max_depth) = self.options.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let entries = walker
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.should_descend(entry));

        for entry in entries {
            if self.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    let message = match err.io_error() {
                        Some(io) => io.to_string(),
                        None => err.to_string(),
                    };
                    warn!("cannot read directory {}: {}", path.display(), message);
                    outcome.issues.push(ScanIssue {
                        kind: IssueKind::Unreadable,
                        path,
                        message,
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() && is_git_repository(entry.path()) {
                self.visit_repository(entry.path(), &mut outcome);
            }
        }

        outcome
    }

    /// Directories are entered unless ignored or the marker itself.
    fn should_descend(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        name != MARKER && !self.registry.is_ignored(&name)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    fn visit_repository(&self, dir: &Path, outcome: &mut WalkOutcome) {
        outcome.repositories_found += 1;

        let Some(remote) = collect_repo_info(self.runner, dir) else {
            outcome.issues.push(ScanIssue {
                kind: IssueKind::NoRemote,
                path: dir.to_path_buf(),
                message: "no remote URL could be determined".to_string(),
            });
            return;
        };

        match classify(self.registry.providers(), &remote.url, &remote.branch) {
            Some(hit) => {
                debug!(repo = %dir.display(), provider = %hit.provider, "{}", hit.descriptor);
                outcome.found.push(&hit.provider, hit.descriptor);
                outcome.classified += 1;
            }
            None => outcome.unclassified += 1,
        }
    }
}

/// Whether `path` holds a repository marker.
pub fn is_git_repository(path: &Path) -> bool {
    path.join(MARKER).exists()
}
