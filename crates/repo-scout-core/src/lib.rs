//! # repo-scout-core
//!
//! Finds Git clones below a directory and sorts them by hosting provider.
//!
//! ## Features
//!
//! - **Ignore-aware traversal** that keeps going past unreadable directories
//!   and into nested repositories
//! - **Layered metadata lookup**: branch and remote URL are resolved through
//!   ordered fallbacks (detached HEAD, missing upstream, non-`origin` remotes)
//! - **Extensible providers**: GitHub, Gitee, Gitcode and CNB are built in;
//!   more can be registered at runtime by pattern
//! - **Structured results**: an ordered provider → `owner/repo:branch` map plus
//!   a serializable [`ScanReport`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_scout_core::DiscoveryService;
//! use std::path::Path;
//!
//! let service = DiscoveryService::new()?;
//! service.register_pattern("Corp", r"internalgit\.corp[:/](?<repo>[^/]+/[^/.]+)")?;
//!
//! let report = service.run_scan(Path::new("/home/user/plugins"))?;
//! println!("{} repositories classified", report.classified);
//! for (provider, repos) in service.results().iter() {
//!     println!("{provider}: {}", repos.join(", "));
//! }
//! # Ok::<(), repo_scout_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! Data flows one way: [`service`] → [`scanner`] → [`collector`] →
//! [`command`] → [`classifier`] → results.
//!
//! - [`registry`] - Providers, URL patterns and the ignore set
//! - [`command`] - External `git` invocation
//! - [`collector`] - Branch / remote URL fallback chains
//! - [`classifier`] - URL to provider matching
//! - [`scanner`] - Directory traversal
//! - [`service`] - Scan orchestration and live results
//! - [`models`] - Configuration and report types
//! - [`error`] - Custom error types
//! - [`l10n`] - Localization utilities
//! - [`logging`] - Subscriber setup for binaries
//!
//! ## CLI Binary
//!
//! This crate also provides a `repo-scout` binary. See its `--help` output.

pub mod classifier;
pub mod collector;
pub mod command;
pub mod error;
pub mod l10n;
pub mod logging;
pub mod models;
pub mod registry;
pub mod scanner;
pub mod service;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use command::{CommandRunner, GitCli};
pub use error::{CommandError, Error, Result};
pub use models::{IssueKind, ProviderConfig, ProviderRepos, ScanConfig, ScanIssue, ScanReport};
pub use registry::{HostRegistry, SlugExtractor, UrlPattern};
pub use service::{startup, DiscoveryService};

/// Library version, derived from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
