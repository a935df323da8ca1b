//! Maps a remote URL onto the first provider that recognises it.

use crate::models::descriptor;
use crate::registry::Provider;

/// A repository attributed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Provider name as registered.
    pub provider: String,

    /// `owner/repo:branch`.
    pub descriptor: String,
}

/// Tries `providers` in order and returns the first hit.
///
/// `None` means no provider claims the URL; the repository is meant to be
/// dropped without a warning.
///
/// # Example
///
/// ```
/// use repo_scout_core::classifier::classify;
/// use repo_scout_core::registry::HostRegistry;
///
/// let registry = HostRegistry::with_defaults().unwrap();
/// let hit = classify(registry.providers(), "git@gitee.com:acme/sprockets.git", "dev").unwrap();
/// assert_eq!(hit.provider, "Gitee");
/// assert_eq!(hit.descriptor, "acme/sprockets:dev");
/// ```
pub fn classify(providers: &[Provider], url: &str, branch: &str) -> Option<Classification> {
    let url = url.trim();
    providers.iter().find_map(|provider| {
        provider.extract_slug(url).map(|slug| Classification {
            provider: provider.name().to_string(),
            descriptor: descriptor(&slug, branch),
        })
    })
}
