//! Configuration and result types.
//!
//! Everything here is serde-serializable so the CLI can emit JSON and read
//! its configuration from a JSON file.

use crate::error::{Error, Result};
use crate::registry::provider_key;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// A provider registration supplied through configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Provider name, used as the output key.
    pub name: String,

    /// Regular expression with a `repo` named group capturing `owner/repo`.
    pub pattern: String,
}

/// Configuration for a discovery service and its startup scan.
///
/// # Example
///
/// ```
/// # use repo_scout_core::ScanConfig;
/// # use std::path::PathBuf;
/// let config = ScanConfig {
///     root: PathBuf::from("/srv/plugins"),
///     extra_ignore: vec!["target".to_string()],
///     ..ScanConfig::default()
/// };
/// assert!(config.auto_scan);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory the scan starts from.
    pub root: PathBuf,

    /// Run a scan of `root` as soon as the service starts up.
    pub auto_scan: bool,

    /// Register the built-in providers before any configured ones.
    pub default_providers: bool,

    /// Additional providers, appended in order after the built-ins.
    pub providers: Vec<ProviderConfig>,

    /// Replacement for the default ignore set.
    ///
    /// `None` keeps the defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,

    /// Names added to the ignore set after `ignore` is applied.
    pub extra_ignore: Vec<String>,

    /// Maximum depth below `root`; `None` means unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Whether to descend through symbolic links.
    ///
    /// Off by default, which also avoids cycles.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    /// Scans the home directory with the built-in providers and ignore set.
    fn default() -> Self {
        Self {
            root: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            auto_scan: true,
            default_providers: true,
            providers: Vec::new(),
            ignore: None,
            extra_ignore: Vec::new(),
            max_depth: None,
            follow_symlinks: false,
        }
    }
}

impl ScanConfig {
    /// Reads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::path_not_found(path));
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }
}

/// Why a directory or repository contributed nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The directory could not be listed; its subtree was skipped.
    Unreadable,

    /// The repository has no resolvable remote URL.
    NoRemote,
}

/// A directory or repository skipped during a scan.
///
/// Every issue is also logged as a warning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanIssue {
    /// What went wrong.
    pub kind: IssueKind,

    /// The directory concerned.
    pub path: PathBuf,

    /// Human-readable detail.
    pub message: String,
}

/// Summary of one completed scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    /// Directory the scan started from.
    pub root: PathBuf,

    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,

    /// Duration of the traversal in milliseconds.
    pub elapsed_ms: u64,

    /// Directories carrying a repository marker.
    pub repositories_found: usize,

    /// Repositories recorded under some provider.
    pub classified: usize,

    /// Repositories with a remote URL that no provider recognised.
    ///
    /// These are dropped silently; the count is the only trace.
    pub unclassified: usize,

    /// Directories and repositories that were skipped.
    pub issues: Vec<ScanIssue>,

    /// Whether the scan stopped early on request.
    pub cancelled: bool,
}

/// Provider name to `owner/repo:branch` descriptors, in registration order.
///
/// Entries are keyed by [`provider_key`], so lookups are case-insensitive
/// while output keeps the spelling the provider was first registered with.
/// Serializes as a JSON object whose keys follow registration order.
#[derive(Debug, Clone, Default)]
pub struct ProviderRepos {
    entries: IndexMap<String, (String, Vec<String>)>,
}

impl ProviderRepos {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty list for `name` unless one already exists.
    pub fn ensure(&mut self, name: &str) {
        self.entry(name);
    }

    /// Appends a descriptor under `name`, creating the entry if needed.
    pub fn push(&mut self, name: &str, descriptor: String) {
        self.entry(name).push(descriptor);
    }

    /// Descriptors recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .get(&provider_key(name))
            .map(|(_, list)| list.as_slice())
    }

    /// Removes and returns the descriptors for `name`, leaving an empty list.
    pub fn take(&mut self, name: &str) -> Vec<String> {
        self.entries
            .get_mut(&provider_key(name))
            .map(|(_, list)| std::mem::take(list))
            .unwrap_or_default()
    }

    /// Replaces the list for `name`.
    pub fn replace(&mut self, name: &str, descriptors: Vec<String>) {
        *self.entry(name) = descriptors;
    }

    /// Empties every list while keeping all keys.
    pub fn clear_lists(&mut self) {
        for (_, list) in self.entries.values_mut() {
            list.clear();
        }
    }

    /// Provider names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    /// `(name, descriptors)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .values()
            .map(|(name, list)| (name.as_str(), list.as_slice()))
    }

    /// Total number of descriptors across providers.
    pub fn total(&self) -> usize {
        self.entries.values().map(|(_, list)| list.len()).sum()
    }

    fn entry(&mut self, name: &str) -> &mut Vec<String> {
        &mut self
            .entries
            .entry(provider_key(name))
            .or_insert_with(|| (name.to_string(), Vec::new()))
            .1
    }
}

// IndexMap equality ignores order; two results are only equal in the same order.
impl PartialEq for ProviderRepos {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.values().eq(other.entries.values())
    }
}

impl Eq for ProviderRepos {}

impl Serialize for ProviderRepos {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Formats the descriptor recorded for a classified repository.
///
/// # Example
///
/// ```
/// assert_eq!(repo_scout_core::models::descriptor("acme/widgets", "main"), "acme/widgets:main");
/// ```
pub fn descriptor(slug: &str, branch: &str) -> String {
    format!("{slug}:{branch}")
}
