//! Hosting providers and traversal configuration.
//!
//! A [`HostRegistry`] holds the ordered list of providers tried during
//! classification and the set of directory names the walker never enters.
//! Registration order matters: the first provider whose pattern yields a
//! slug wins.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Name of the capture group every [`UrlPattern`] must define.
pub const REPO_GROUP: &str = "repo";

/// Directory names skipped by default.
pub const DEFAULT_IGNORE: &[&str] = &["data", "node_modules", "temp", "logs", "cache", "dist"];

/// Built-in providers as `(name, host expression)`, in registration order.
///
/// The host expression is spliced into [`UrlPattern::for_host`].
pub const BUILTIN_PROVIDERS: &[(&str, &str)] = &[
    ("GitHub", r"github\.com"),
    ("Gitee", r"gitee\.com"),
    ("Gitcode", r"gitcode\.com"),
    ("CNB", r"cnb\.cool"),
];

/// Extracts an `owner/repo` slug from a remote URL.
///
/// Decouples classification from any particular matching engine: anything
/// that can recognise a provider's URLs can be registered.
pub trait SlugExtractor: Send + Sync {
    /// Returns the slug when `url` belongs to this provider.
    fn extract_slug(&self, url: &str) -> Option<String>;
}

impl<F> SlugExtractor for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn extract_slug(&self, url: &str) -> Option<String> {
        self(url)
    }
}

/// A case-insensitive regular expression with a `repo` named group.
///
/// # Example
///
/// ```
/// use repo_scout_core::registry::{SlugExtractor, UrlPattern};
///
/// let pattern = UrlPattern::new("Corp", r"internalgit\.corp[:/](?<repo>[^/]+/[^/.]+)").unwrap();
/// assert_eq!(
///     pattern.extract_slug("git@INTERNALGIT.corp:tools/deployer.git"),
///     Some("tools/deployer".to_string())
/// );
/// ```
#[derive(Debug, Clone)]
pub struct UrlPattern {
    regex: Regex,
}

impl UrlPattern {
    /// Compiles `pattern` for the provider `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the expression does not compile or
    /// has no `repo` capture group.
    pub fn new(name: &str, pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::invalid_pattern(name, e.to_string()))?;

        if !regex.capture_names().any(|n| n == Some(REPO_GROUP)) {
            return Err(Error::invalid_pattern(
                name,
                format!("missing named capture group `{REPO_GROUP}`"),
            ));
        }

        Ok(Self { regex })
    }

    /// Builds the standard pattern for a host expression such as `github\.com`.
    ///
    /// Accepts URL-style (`https://`, `ssh://` with optional port, user info)
    /// and SCP-style (`git@host:owner/repo`) addresses, with or without a
    /// `.git` suffix or trailing slash.
    ///
    /// # Arguments
    ///
    /// * `name` - Provider name, used in error messages
    /// * `host` - Regular expression matching the host, dots escaped
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `host` is not a valid expression.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_scout_core::registry::{SlugExtractor, UrlPattern};
    ///
    /// let forge = UrlPattern::for_host("Forge", r"git\.example\.org").unwrap();
    /// assert_eq!(
    ///     forge.extract_slug("ssh://git@git.example.org:2222/team/app.git"),
    ///     Some("team/app".to_string())
    /// );
    /// assert_eq!(forge.extract_slug("https://github.com/team/app"), None);
    /// ```
    pub fn for_host(name: &str, host: &str) -> Result<Self> {
        let pattern = format!(
            r"(?:^|[/@.]){host}(?::\d+)?[:/]+(?<{REPO_GROUP}>[^/\s:]+/[^/\s]+?)(?:\.git)?/?$"
        );
        Self::new(name, &pattern)
    }

    /// The source expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl SlugExtractor for UrlPattern {
    fn extract_slug(&self, url: &str) -> Option<String> {
        self.regex
            .captures(url)
            .and_then(|caps| caps.name(REPO_GROUP))
            .map(|m| m.as_str())
            .filter(|slug| !slug.is_empty())
            .map(str::to_string)
    }
}

/// A registered hosting provider.
#[derive(Clone)]
pub struct Provider {
    name: String,
    extractor: Arc<dyn SlugExtractor>,
}

impl Provider {
    /// Creates a provider from a name and any slug extractor.
    pub fn new(name: impl Into<String>, extractor: impl SlugExtractor + 'static) -> Self {
        Self {
            name: name.into(),
            extractor: Arc::new(extractor),
        }
    }

    /// Name as registered (original case).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive identity used to group results.
    pub fn key(&self) -> String {
        provider_key(&self.name)
    }

    /// Returns the slug if `url` belongs to this provider.
    pub fn extract_slug(&self, url: &str) -> Option<String> {
        self.extractor.extract_slug(url)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider").field("name", &self.name).finish()
    }
}

/// Normalises a provider name into its grouping key.
pub fn provider_key(name: &str) -> String {
    name.to_lowercase()
}

/// Ordered providers plus the ignore set.
///
/// Cloning is cheap (extractors are shared) and yields the snapshot a scan
/// works from, so later mutations never affect a scan already in flight.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    providers: Vec<Provider>,
    ignore: BTreeSet<String>,
}

impl HostRegistry {
    /// Creates an empty registry: no providers, nothing ignored.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in providers and default ignore set.
    ///
    /// # Errors
    ///
    /// Only fails if a built-in host expression stops compiling.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::empty();
        for (name, host) in BUILTIN_PROVIDERS {
            registry.register(*name, UrlPattern::for_host(name, host)?);
        }
        registry.set_ignore(DEFAULT_IGNORE.iter().copied());
        Ok(registry)
    }

    /// Appends a provider. Duplicate names are kept; earlier entries win ties.
    pub fn register(&mut self, name: impl Into<String>, extractor: impl SlugExtractor + 'static) {
        self.providers.push(Provider::new(name, extractor));
    }

    /// Compiles `pattern` and appends it under `name`.
    ///
    /// # Arguments
    ///
    /// * `name` - Output key for repositories this provider claims
    /// * `pattern` - Regular expression with a `repo` named group
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the expression does not compile
    /// or lacks the `repo` group. The registry is left unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_scout_core::HostRegistry;
    ///
    /// let mut registry = HostRegistry::with_defaults().unwrap();
    /// registry
    ///     .register_pattern("Corp", r"internalgit\.corp[:/](?<repo>[^/]+/[^/.]+)")
    ///     .unwrap();
    /// assert!(registry.register_pattern("Broken", r"corp/(\w+)").is_err());
    /// assert_eq!(registry.provider_names().last().unwrap(), "Corp");
    /// ```
    pub fn register_pattern(&mut self, name: &str, pattern: &str) -> Result<()> {
        let compiled = UrlPattern::new(name, pattern)?;
        self.register(name, compiled);
        Ok(())
    }

    /// Replaces the ignore set.
    ///
    /// Names are matched against directory basenames exactly, so `Build`
    /// and `build` are different entries.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_scout_core::HostRegistry;
    ///
    /// let mut registry = HostRegistry::with_defaults().unwrap();
    /// registry.set_ignore(["target", ".cache"]);
    /// assert!(registry.is_ignored("target"));
    /// assert!(!registry.is_ignored("node_modules"));
    /// ```
    pub fn set_ignore<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = names.into_iter().map(Into::into).collect();
    }

    /// Adds names to the ignore set.
    pub fn add_ignore<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(names.into_iter().map(Into::into));
    }

    /// Whether a directory basename is excluded from traversal.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.contains(name)
    }

    /// Ignored names in sorted order.
    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.ignore.iter().map(String::as_str)
    }

    /// Providers in registration order, duplicates included.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Distinct provider names in first-registration order.
    ///
    /// Names differing only in case collapse onto the first spelling.
    pub fn provider_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.providers
            .iter()
            .filter(|p| seen.insert(p.key()))
            .map(|p| p.name().to_string())
            .collect()
    }
}
