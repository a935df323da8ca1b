//! Branch and remote URL discovery for a single repository.
//!
//! Each value is resolved by an ordered list of strategies. A strategy is a
//! plain function; the first one that returns `Ok` wins and failures are only
//! traced. The lists are public so each tier can be exercised on its own.
//!
//! | value       | tiers                                                         |
//! |-------------|---------------------------------------------------------------|
//! | branch      | `rev-parse --abbrev-ref HEAD`, `branch --show-current`, gitoxide, `"HEAD"` |
//! | remote name | `config --get branch.<b>.remote`, `"origin"`                  |
//! | remote URL  | `remote get-url <r>`, first `(fetch)` of `remote -v`, gitoxide |

use crate::command::CommandRunner;
use crate::error::{CommandError, Error, Result};
use std::path::Path;
use tracing::{trace, warn};

/// Branch reported when no symbolic branch can be determined.
pub const DETACHED_BRANCH: &str = "HEAD";

/// Remote queried when the branch has no configured upstream remote.
pub const DEFAULT_REMOTE: &str = "origin";

/// A resolution step: `(label, function(runner, repo_dir, context))`.
///
/// `context` is the value resolved by the previous stage (branch for the
/// remote name, remote name for the URL) and may be ignored.
pub type Strategy = (&'static str, fn(&dyn CommandRunner, &Path, &str) -> Result<String>);

/// Tiers determining the current branch.
pub const BRANCH_STRATEGIES: &[Strategy] = &[
    ("rev-parse --abbrev-ref HEAD", branch_from_rev_parse),
    ("branch --show-current", branch_from_show_current),
    ("in-process HEAD", branch_from_repository_head),
];

/// Tiers determining which remote to ask for a URL.
pub const REMOTE_NAME_STRATEGIES: &[Strategy] = &[("branch upstream remote", upstream_remote)];

/// Tiers determining the remote URL.
pub const URL_STRATEGIES: &[Strategy] = &[
    ("remote get-url", url_from_get_url),
    ("remote -v", url_from_remote_listing),
    ("in-process config", url_from_repository_config),
];

/// Where a repository fetches from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRemote {
    /// Trimmed remote URL.
    pub url: String,

    /// Current branch, or [`DETACHED_BRANCH`].
    pub branch: String,
}

/// Runs `strategies` in order and returns the first success.
pub fn resolve(
    strategies: &[Strategy],
    runner: &dyn CommandRunner,
    dir: &Path,
    context: &str,
) -> Option<String> {
    for (label, strategy) in strategies {
        match strategy(runner, dir, context) {
            Ok(value) => return Some(value),
            Err(e) => trace!(repo = %dir.display(), tier = *label, error = %e, "tier failed"),
        }
    }
    None
}

/// Resolves branch and remote URL for a directory holding a repository marker.
///
/// Returns `None` and logs a warning naming `dir` when no remote URL can be
/// found; the caller records nothing for such a repository.
pub fn collect_repo_info(runner: &dyn CommandRunner, dir: &Path) -> Option<RepoRemote> {
    let branch = resolve(BRANCH_STRATEGIES, runner, dir, "")
        .unwrap_or_else(|| DETACHED_BRANCH.to_string());

    let remote = resolve(REMOTE_NAME_STRATEGIES, runner, dir, &branch)
        .unwrap_or_else(|| DEFAULT_REMOTE.to_string());

    match resolve(URL_STRATEGIES, runner, dir, &remote) {
        Some(url) => Some(RepoRemote { url, branch }),
        None => {
            warn!("no remote URL found for repository {}", dir.display());
            None
        }
    }
}

fn run_non_empty(runner: &dyn CommandRunner, dir: &Path, args: &[&str]) -> Result<String> {
    let output = runner.run(dir, args)?;
    if output.is_empty() {
        return Err(CommandError::EmptyOutput(format!("git {}", args.join(" "))).into());
    }
    Ok(output)
}

fn branch_from_rev_parse(runner: &dyn CommandRunner, dir: &Path, _: &str) -> Result<String> {
    run_non_empty(runner, dir, &["rev-parse", "--abbrev-ref", "HEAD"])
}

fn branch_from_show_current(runner: &dyn CommandRunner, dir: &Path, _: &str) -> Result<String> {
    // Prints nothing on a detached HEAD.
    run_non_empty(runner, dir, &["branch", "--show-current"])
}

fn branch_from_repository_head(_: &dyn CommandRunner, dir: &Path, _: &str) -> Result<String> {
    read_head_branch(dir)?
        .ok_or_else(|| Error::other(format!("detached HEAD in {}", dir.display())))
}

fn upstream_remote(runner: &dyn CommandRunner, dir: &Path, branch: &str) -> Result<String> {
    let key = format!("branch.{branch}.remote");
    run_non_empty(runner, dir, &["config", "--get", &key])
}

fn url_from_get_url(runner: &dyn CommandRunner, dir: &Path, remote: &str) -> Result<String> {
    run_non_empty(runner, dir, &["remote", "get-url", remote])
}

fn url_from_remote_listing(runner: &dyn CommandRunner, dir: &Path, _: &str) -> Result<String> {
    let listing = runner.run(dir, &["remote", "-v"])?;
    first_fetch_url(&listing)
        .map(str::to_string)
        .ok_or_else(|| CommandError::EmptyOutput("git remote -v".to_string()).into())
}

fn url_from_repository_config(_: &dyn CommandRunner, dir: &Path, remote: &str) -> Result<String> {
    let remotes = read_remote_urls(dir)?;
    remotes
        .iter()
        .find(|(name, _)| name == remote)
        .or_else(|| remotes.first())
        .map(|(_, url)| url.clone())
        .ok_or_else(|| Error::other(format!("no remotes configured in {}", dir.display())))
}

/// Picks the URL of the first `(fetch)` line of `git remote -v` output.
///
/// ```
/// # use repo_scout_core::collector::first_fetch_url;
/// let listing = "mirror\thttps://gitee.com/a/b.git (fetch)\nmirror\thttps://gitee.com/a/b.git (push)";
/// assert_eq!(first_fetch_url(listing), Some("https://gitee.com/a/b.git"));
/// ```
pub fn first_fetch_url(listing: &str) -> Option<&str> {
    listing.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let _name = fields.next()?;
        let url = fields.next()?;
        (fields.next()? == "(fetch)").then_some(url)
    })
}

/// Reads the short name of the branch `HEAD` points at, without the `git` binary.
///
/// Unborn branches count as branches. Returns `Ok(None)` for a detached
/// `HEAD`.
///
/// # Errors
///
/// Returns [`Error::GitOpen`] if `repo_path` is not a repository, or
/// [`Error::Other`] if `HEAD` cannot be read.
pub fn read_head_branch(repo_path: &Path) -> Result<Option<String>> {
    let repo = gix::open(repo_path).map_err(|e| Error::git_open(repo_path, e))?;
    let head = repo
        .head_name()
        .map_err(|e| Error::other(format!("cannot read HEAD of {}: {}", repo_path.display(), e)))?;
    Ok(head.map(|name| name.shorten().to_string()))
}

/// Reads `(remote name, fetch URL)` pairs with gitoxide, without the `git` binary.
///
/// Remotes whose configuration cannot be loaded are skipped.
pub fn read_remote_urls(repo_path: &Path) -> Result<Vec<(String, String)>> {
    let repo = gix::open(repo_path).map_err(|e| Error::git_open(repo_path, e))?;

    let mut remotes = Vec::new();
    for name in repo.remote_names() {
        let name_str = name.as_ref();

        let Ok(remote) = repo.find_remote(name_str) else {
            continue;
        };
        if let Some(url) = remote.url(gix::remote::Direction::Fetch) {
            remotes.push((name_str.to_string(), url.to_bstring().to_string()));
        }
    }

    Ok(remotes)
}
