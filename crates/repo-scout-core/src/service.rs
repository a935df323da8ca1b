//! The discovery service: registry, live results and scan orchestration.
//!
//! A [`DiscoveryService`] owns everything a scan needs. It is `Send + Sync`,
//! so one instance can be shared behind an `Arc`, queried while a background
//! scan runs, and reconfigured between scans. Several independent services
//! may coexist.

use crate::command::{CommandRunner, GitCli};
use crate::error::{Error, Result};
use crate::models::{ProviderRepos, ScanConfig, ScanReport};
use crate::registry::{HostRegistry, SlugExtractor, UrlPattern};
use crate::scanner::{TreeWalker, WalkOptions};
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info};

/// Handle of a scan running on a worker thread.
pub type ScanHandle = JoinHandle<Result<ScanReport>>;

/// Discovers repositories and keeps the provider-keyed results.
///
/// # Example
///
/// ```no_run
/// use repo_scout_core::DiscoveryService;
/// use std::path::Path;
///
/// let service = DiscoveryService::new()?;
/// service.register_pattern("Corp", r"internalgit\.corp[:/](?<repo>[^/]+/[^/.]+)")?;
/// service.add_ignore(["target"]);
///
/// let report = service.run_scan(Path::new("/srv/plugins"))?;
/// for (provider, repos) in service.results().iter() {
///     println!("{provider}: {repos:?}");
/// }
/// println!("took {} ms", report.elapsed_ms);
/// # Ok::<(), repo_scout_core::Error>(())
/// ```
pub struct DiscoveryService {
    registry: RwLock<HostRegistry>,
    results: RwLock<ProviderRepos>,
    options: RwLock<WalkOptions>,
    runner: Arc<dyn CommandRunner>,
    scanning: AtomicBool,
    cancel: AtomicBool,
}

impl DiscoveryService {
    /// Creates a service with the built-in providers, default ignore set and
    /// the `git` binary.
    ///
    /// # Errors
    ///
    /// Only fails if a built-in provider pattern stops compiling.
    pub fn new() -> Result<Self> {
        Ok(Self::with_registry(HostRegistry::with_defaults()?))
    }

    /// Creates a service from an existing registry.
    pub fn with_registry(registry: HostRegistry) -> Self {
        let mut results = ProviderRepos::new();
        for name in registry.provider_names() {
            results.ensure(&name);
        }

        Self {
            registry: RwLock::new(registry),
            results: RwLock::new(results),
            options: RwLock::new(WalkOptions::default()),
            runner: Arc::new(GitCli::new()),
            scanning: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
        }
    }

    /// Builds a service as described by `config`, without scanning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if a configured provider pattern is
    /// unusable.
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let mut registry = if config.default_providers {
            HostRegistry::with_defaults()?
        } else {
            let mut registry = HostRegistry::empty();
            registry.set_ignore(crate::registry::DEFAULT_IGNORE.iter().copied());
            registry
        };

        for provider in &config.providers {
            registry.register_pattern(&provider.name, &provider.pattern)?;
        }
        if let Some(ignore) = &config.ignore {
            registry.set_ignore(ignore.iter().cloned());
        }
        registry.add_ignore(config.extra_ignore.iter().cloned());

        Ok(Self::with_registry(registry).with_options(WalkOptions {
            max_depth: config.max_depth,
            follow_symlinks: config.follow_symlinks,
        }))
    }

    /// Replaces the command runner used for `git` invocations.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Sets traversal limits for subsequent scans.
    pub fn with_options(self, options: WalkOptions) -> Self {
        *write(&self.options) = options;
        self
    }

    /// Registers a provider with any slug extractor.
    ///
    /// Its result list exists (empty) immediately.
    pub fn register_provider(&self, name: &str, extractor: impl SlugExtractor + 'static) {
        write(&self.registry).register(name, extractor);
        write(&self.results).ensure(name);
    }

    /// Registers a provider from a regular expression with a `repo` group.
    ///
    /// The provider is tried after every provider registered before it and
    /// applies from the next scan on.
    ///
    /// # Arguments
    ///
    /// * `name` - Output key; an empty list appears under it right away
    /// * `pattern` - Case-insensitive expression whose `repo` group captures
    ///   `owner/repo`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the expression does not compile
    /// or lacks the `repo` group.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_scout_core::DiscoveryService;
    ///
    /// let service = DiscoveryService::new().unwrap();
    /// service
    ///     .register_pattern("CorpGit", r"internalgit\.corp[:/](?<repo>[^/]+/[^/.]+)")
    ///     .unwrap();
    /// assert_eq!(service.repositories("corpgit"), Some(vec![]));
    /// ```
    pub fn register_pattern(&self, name: &str, pattern: &str) -> Result<()> {
        let compiled = UrlPattern::new(name, pattern)?;
        self.register_provider(name, compiled);
        Ok(())
    }

    /// Replaces the ignore set for subsequent scans.
    pub fn set_ignore<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        write(&self.registry).set_ignore(names);
    }

    /// Adds names to the ignore set for subsequent scans.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_scout_core::DiscoveryService;
    ///
    /// let service = DiscoveryService::new().unwrap();
    /// service.add_ignore(["target", "vendor"]);
    /// assert!(service.ignored().contains(&"vendor".to_string()));
    /// assert!(service.ignored().contains(&"node_modules".to_string()));
    /// ```
    pub fn add_ignore<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        write(&self.registry).add_ignore(names);
    }

    /// Ignored directory names, sorted.
    pub fn ignored(&self) -> Vec<String> {
        read(&self.registry).ignored().map(str::to_string).collect()
    }

    /// Distinct provider names in registration order.
    pub fn providers(&self) -> Vec<String> {
        read(&self.registry).provider_names()
    }

    /// Snapshot of the provider-keyed results.
    ///
    /// Only reliable once no scan is running.
    pub fn results(&self) -> ProviderRepos {
        read(&self.results).clone()
    }

    /// Descriptors recorded for one provider (case-insensitive).
    pub fn repositories(&self, provider: &str) -> Option<Vec<String>> {
        read(&self.results).get(provider).map(<[String]>::to_vec)
    }

    /// Whether a scan is in progress.
    ///
    /// Observational only: it does not prevent overlapping scans.
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Asks a running scan to stop at the next directory.
    ///
    /// What was found up to that point is still published, and the report
    /// has `cancelled` set. The signal is cleared when the next scan starts.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Empties every provider list, keeping the keys.
    pub fn reset(&self) {
        write(&self.results).clear_lists();
    }

    /// Scans `root` and replaces the results with what was found.
    ///
    /// Directory-level problems never fail the scan; they are listed in the
    /// report and logged as warnings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Orchestration`] if the walk panicked. The in-progress
    /// flag is cleared either way.
    pub fn run_scan(&self, root: &Path) -> Result<ScanReport> {
        self.cancel.store(false, Ordering::Release);
        self.scan(root)
    }

    /// Runs [`run_scan`](Self::run_scan) on a dedicated worker thread.
    ///
    /// The cancellation signal is cleared before the thread starts, so a
    /// [`cancel`](Self::cancel) issued as soon as this returns is honoured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the worker thread cannot be spawned.
    pub fn spawn_scan(self: &Arc<Self>, root: impl Into<PathBuf>) -> Result<ScanHandle> {
        self.cancel.store(false, Ordering::Release);
        let service = Arc::clone(self);
        let root = root.into();
        let handle = thread::Builder::new()
            .name("repo-scan".to_string())
            .spawn(move || service.scan(&root))?;
        Ok(handle)
    }

    fn scan(&self, root: &Path) -> Result<ScanReport> {
        let _guard = ScanGuard::start(&self.scanning);
        self.reset();

        let started_at = Utc::now();
        let timer = Instant::now();
        info!("scanning local repositories under {}", root.display());

        let registry = read(&self.registry).clone();
        let options = read(&self.options).clone();

        let walked = panic::catch_unwind(AssertUnwindSafe(|| {
            TreeWalker::new(&registry, self.runner.as_ref())
                .with_options(options)
                .with_cancel(&self.cancel)
                .walk(root)
        }));

        let elapsed = timer.elapsed();
        let mut outcome = match walked {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    "scan of {} failed after {:?}: {}",
                    root.display(),
                    elapsed,
                    message
                );
                return Err(Error::orchestration(root, message));
            }
        };

        {
            let mut results = write(&self.results);
            let names: Vec<String> = results.names().map(str::to_string).collect();
            for name in names {
                results.replace(&name, outcome.found.take(&name));
            }
        }

        info!(
            "scan of {} finished in {:?}: {} classified, {} skipped",
            root.display(),
            elapsed,
            outcome.classified,
            outcome.issues.len()
        );

        Ok(ScanReport {
            root: root.to_path_buf(),
            started_at,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            repositories_found: outcome.repositories_found,
            classified: outcome.classified,
            unclassified: outcome.unclassified,
            issues: std::mem::take(&mut outcome.issues),
            cancelled: outcome.cancelled,
        })
    }
}

/// Builds a service from `config` and, if `auto_scan` is set, starts scanning
/// `config.root` in the background.
///
/// # Example
///
/// ```no_run
/// use repo_scout_core::{startup, ScanConfig};
///
/// let (service, handle) = startup(&ScanConfig::default())?;
/// if let Some(handle) = handle {
///     let _ = handle.join();
/// }
/// println!("{:?}", service.repositories("GitHub"));
/// # Ok::<(), repo_scout_core::Error>(())
/// ```
pub fn startup(config: &ScanConfig) -> Result<(Arc<DiscoveryService>, Option<ScanHandle>)> {
    let service = Arc::new(DiscoveryService::from_config(config)?);
    let handle = if config.auto_scan {
        Some(service.spawn_scan(&config.root)?)
    } else {
        None
    };
    Ok((service, handle))
}

/// Sets the in-progress flag and clears it on drop, including on unwind.
struct ScanGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ScanGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// Poisoning only means another thread panicked mid-update; the data is
// still a valid registry or result map.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandRunner;
    use crate::error::CommandError;
    use crate::models::IssueKind;
    use crate::scanner::MARKER;
    use crate::testing::{capture_warnings, FakeRunner};
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    fn mock_repo(dir: &Path) -> PathBuf {
        fs::create_dir_all(dir.join(MARKER)).unwrap();
        dir.to_path_buf()
    }

    fn service_with(runner: FakeRunner) -> DiscoveryService {
        DiscoveryService::new().unwrap().with_runner(Arc::new(runner))
    }

    #[test]
    fn test_keys_exist_before_any_scan() {
        let service = DiscoveryService::new().unwrap();
        let results = service.results();
        assert_eq!(
            results.names().collect::<Vec<_>>(),
            vec!["GitHub", "Gitee", "Gitcode", "CNB"]
        );
        assert_eq!(results.total(), 0);
        assert_eq!(service.repositories("github"), Some(vec![]));
        assert_eq!(service.repositories("Nowhere"), None);
    }

    #[test]
    fn test_mixed_providers_with_ignored_nested_repo() {
        let temp = TempDir::new().unwrap();
        let r1 = mock_repo(&temp.path().join("r1"));
        let r2 = mock_repo(&temp.path().join("r2"));
        let hidden = mock_repo(&temp.path().join("r1/node_modules/dep"));

        let runner = FakeRunner::new()
            .repo(&r1, "main", "https://github.com/acme/widgets.git")
            .repo(&r2, "dev", "git@gitee.com:acme/sprockets.git")
            .repo(&hidden, "main", "https://github.com/acme/hidden.git");
        let service = service_with(runner);

        let report = service.run_scan(temp.path()).unwrap();

        assert_eq!(
            service.repositories("GitHub").unwrap(),
            vec!["acme/widgets:main"]
        );
        assert_eq!(
            service.repositories("Gitee").unwrap(),
            vec!["acme/sprockets:dev"]
        );
        assert_eq!(report.classified, 2);
        assert!(report.issues.is_empty());
        assert!(!service.is_scanning());
    }

    #[test]
    fn test_rescan_replaces_previous_results() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("repo"));
        let runner = FakeRunner::new().repo(&repo, "main", "https://github.com/acme/repo");
        let service = service_with(runner);

        service.run_scan(temp.path()).unwrap();
        let first = service.results();
        service.run_scan(temp.path()).unwrap();
        assert_eq!(service.results(), first);
        assert_eq!(service.repositories("GitHub").unwrap().len(), 1);

        fs::remove_dir_all(&repo).unwrap();
        service.run_scan(temp.path()).unwrap();
        assert_eq!(service.results().total(), 0);
    }

    #[test]
    fn test_remote_listing_fallback_classifies() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("forked"));
        let runner = FakeRunner::new()
            .ok(&repo, "rev-parse --abbrev-ref HEAD", "feature")
            .fail(&repo, "remote get-url origin", 2)
            .ok(
                &repo,
                "remote -v",
                "upstream\thttps://gitee.com/acme/forked.git (fetch)\n\
                 upstream\thttps://gitee.com/acme/forked.git (push)\n\
                 vendor\thttps://github.com/vendor/forked.git (fetch)\n\
                 vendor\thttps://github.com/vendor/forked.git (push)",
            );
        let service = service_with(runner);

        service.run_scan(temp.path()).unwrap();
        assert_eq!(
            service.repositories("Gitee").unwrap(),
            vec!["acme/forked:feature"]
        );
        assert_eq!(service.repositories("GitHub"), Some(vec![]));
    }

    #[test]
    fn test_detached_head_descriptor() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("pinned"));
        let runner = FakeRunner::new()
            .ok(&repo, "rev-parse --abbrev-ref HEAD", "HEAD")
            .ok(&repo, "remote get-url origin", "https://gitcode.com/acme/pinned.git");
        let service = service_with(runner);

        service.run_scan(temp.path()).unwrap();
        assert_eq!(
            service.repositories("Gitcode").unwrap(),
            vec!["acme/pinned:HEAD"]
        );
    }

    #[test]
    fn test_repository_without_remotes_logs_one_warning() {
        let temp = TempDir::new().unwrap();
        let lonely = mock_repo(&temp.path().join("lonely"));
        let other = mock_repo(&temp.path().join("other"));
        let runner = FakeRunner::new()
            .ok(&lonely, "rev-parse --abbrev-ref HEAD", "main")
            .repo(&other, "main", "https://github.com/acme/other");
        let service = service_with(runner);

        let (report, logs) = capture_warnings(|| service.run_scan(temp.path()));
        assert_eq!(report.unwrap().classified, 1);

        let warnings: Vec<String> = logs
            .lines()
            .into_iter()
            .filter(|line| line.contains("WARN"))
            .collect();
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains(&lonely.display().to_string()));
    }

    #[test]
    fn test_cancel_right_after_spawn_is_honoured() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("repo"));
        let runner = FakeRunner::new().repo(&repo, "main", "https://github.com/acme/repo");
        let service = Arc::new(service_with(runner));

        // The worker blocks on the registry snapshot until the lock is released.
        let registry = write(&service.registry);
        let handle = service.spawn_scan(temp.path()).unwrap();
        service.cancel();
        drop(registry);

        let report = handle.join().unwrap().unwrap();
        assert!(report.cancelled);
        assert_eq!(report.classified, 0);
    }

    #[test]
    fn test_repository_without_remotes() {
        let temp = TempDir::new().unwrap();
        let lonely = mock_repo(&temp.path().join("lonely"));
        let runner = FakeRunner::new()
            .ok(&lonely, "rev-parse --abbrev-ref HEAD", "main")
            .ok(&lonely, "remote -v", "");
        let service = service_with(runner);

        let report = service.run_scan(temp.path()).unwrap();
        assert_eq!(service.results().total(), 0);
        assert_eq!(report.repositories_found, 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::NoRemote);
        assert_eq!(report.issues[0].path, lonely);
    }

    #[test]
    fn test_custom_provider_registration() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("gateway"));
        let runner = FakeRunner::new().repo(&repo, "main", "git@internalgit.corp:platform/gateway.git");
        let service = service_with(runner);

        service
            .register_pattern("CorpGit", r"internalgit\.corp[:/](?<repo>[^/]+/[^/.]+)")
            .unwrap();
        assert_eq!(service.repositories("CorpGit"), Some(vec![]));

        service.run_scan(temp.path()).unwrap();
        assert_eq!(
            service.repositories("CorpGit").unwrap(),
            vec!["platform/gateway:main"]
        );
        assert_eq!(service.results().total(), 1);
    }

    #[test]
    fn test_ignore_changes_apply_to_next_scan() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("vendor/lib"));
        let runner = FakeRunner::new().repo(&repo, "main", "https://github.com/acme/lib");
        let service = service_with(runner);

        service.run_scan(temp.path()).unwrap();
        assert_eq!(service.results().total(), 1);

        service.add_ignore(["vendor"]);
        service.run_scan(temp.path()).unwrap();
        assert_eq!(service.results().total(), 0);

        service.set_ignore(Vec::<String>::new());
        assert!(service.ignored().is_empty());
        service.run_scan(temp.path()).unwrap();
        assert_eq!(service.results().total(), 1);
    }

    #[test]
    fn test_panic_clears_flag_and_reports() {
        struct Exploding;

        impl CommandRunner for Exploding {
            fn run(&self, _: &Path, _: &[&str]) -> std::result::Result<String, CommandError> {
                panic!("runner exploded");
            }
        }

        let temp = TempDir::new().unwrap();
        mock_repo(&temp.path().join("repo"));
        let service = DiscoveryService::new()
            .unwrap()
            .with_runner(Arc::new(Exploding));

        match service.run_scan(temp.path()) {
            Err(Error::Orchestration { message, .. }) => assert_eq!(message, "runner exploded"),
            other => panic!("expected orchestration error, got {:?}", other),
        }
        assert!(!service.is_scanning());
    }

    #[test]
    fn test_flag_is_set_during_scan() {
        struct FlagCheck(Arc<std::sync::Mutex<Option<Arc<DiscoveryService>>>>);

        impl CommandRunner for FlagCheck {
            fn run(&self, _: &Path, _: &[&str]) -> std::result::Result<String, CommandError> {
                let service = self.0.lock().unwrap();
                assert!(service.as_ref().unwrap().is_scanning());
                Err(CommandError::EmptyOutput("flag check".to_string()))
            }
        }

        let temp = TempDir::new().unwrap();
        mock_repo(&temp.path().join("repo"));
        let slot = Arc::new(std::sync::Mutex::new(None));
        let service = Arc::new(
            DiscoveryService::new()
                .unwrap()
                .with_runner(Arc::new(FlagCheck(Arc::clone(&slot)))),
        );
        *slot.lock().unwrap() = Some(Arc::clone(&service));

        assert!(!service.is_scanning());
        service.run_scan(temp.path()).unwrap();
        assert!(!service.is_scanning());
        slot.lock().unwrap().take();
    }

    #[test]
    fn test_spawn_scan_runs_in_background() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("repo"));
        let runner = FakeRunner::new().repo(&repo, "main", "https://cnb.cool/team/repo");
        let service = Arc::new(service_with(runner));

        let handle = service.spawn_scan(temp.path()).unwrap();
        let report = handle.join().unwrap().unwrap();
        assert_eq!(report.classified, 1);
        assert_eq!(service.repositories("CNB").unwrap(), vec!["team/repo:main"]);
    }

    #[test]
    fn test_cancel_flag_is_reset_by_next_scan() {
        let temp = TempDir::new().unwrap();
        let repo = mock_repo(&temp.path().join("repo"));
        let runner = FakeRunner::new().repo(&repo, "main", "https://github.com/acme/repo");
        let service = service_with(runner);

        service.cancel();
        let report = service.run_scan(temp.path()).unwrap();
        assert!(!report.cancelled);
        assert_eq!(report.classified, 1);
    }

    #[test]
    fn test_from_config() {
        let config = ScanConfig {
            root: PathBuf::from("/unused"),
            auto_scan: false,
            default_providers: false,
            providers: vec![crate::models::ProviderConfig {
                name: "Corp".to_string(),
                pattern: r"corp\.example[:/](?<repo>[^/]+/[^/.]+)".to_string(),
            }],
            ignore: Some(vec!["build".to_string()]),
            extra_ignore: vec!["out".to_string()],
            max_depth: Some(4),
            follow_symlinks: false,
        };

        let service = DiscoveryService::from_config(&config).unwrap();
        assert_eq!(service.providers(), vec!["Corp"]);
        assert_eq!(service.ignored(), vec!["build", "out"]);

        let (service, handle) = startup(&config).unwrap();
        assert!(handle.is_none());
        assert!(!service.is_scanning());
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let config = ScanConfig {
            providers: vec![crate::models::ProviderConfig {
                name: "Broken".to_string(),
                pattern: r"no-group-here".to_string(),
            }],
            ..ScanConfig::default()
        };
        assert!(matches!(
            DiscoveryService::from_config(&config),
            Err(Error::InvalidPattern { .. })
        ));
    }

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("Failed to run git")
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    fn init_repo(dir: &Path, branch: &str, remotes: &[(&str, &str)]) {
        fs::create_dir_all(dir).unwrap();
        git(dir, &["init", "--quiet"]);
        git(dir, &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")]);
        for (name, url) in remotes {
            git(dir, &["remote", "add", name, url]);
        }
    }

    #[test]
    fn test_scan_without_git_binary_reads_repository_in_process() {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }

        let temp = TempDir::new().unwrap();
        init_repo(
            &temp.path().join("x"),
            "main",
            &[("upstream", "git@github.com:acme/x.git")],
        );

        let service = DiscoveryService::new()
            .unwrap()
            .with_runner(Arc::new(GitCli::with_program("no-such-git")));
        let report = service.run_scan(temp.path()).unwrap();

        assert_eq!(service.repositories("GitHub").unwrap(), vec!["acme/x:main"]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_end_to_end_with_git_binary() {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }

        let temp = TempDir::new().unwrap();
        init_repo(
            &temp.path().join("r1"),
            "main",
            &[("origin", "https://github.com/acme/widgets.git")],
        );
        init_repo(
            &temp.path().join("r2"),
            "dev",
            &[("origin", "git@gitee.com:acme/sprockets.git")],
        );
        init_repo(
            &temp.path().join("r1/node_modules/nested"),
            "main",
            &[("origin", "https://github.com/acme/nested.git")],
        );
        init_repo(
            &temp.path().join("mirror"),
            "main",
            &[
                ("backup", "https://gitcode.com/acme/mirror.git"),
                ("vendor", "https://github.com/vendor/mirror.git"),
            ],
        );
        init_repo(&temp.path().join("bare-bones"), "main", &[]);

        let service = DiscoveryService::new().unwrap();
        let report = service.run_scan(temp.path()).unwrap();

        assert_eq!(
            service.repositories("GitHub").unwrap(),
            vec!["acme/widgets:main"]
        );
        assert_eq!(
            service.repositories("Gitee").unwrap(),
            vec!["acme/sprockets:dev"]
        );
        assert_eq!(
            service.repositories("Gitcode").unwrap(),
            vec!["acme/mirror:main"]
        );
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].path, temp.path().join("bare-bones"));
    }
}
