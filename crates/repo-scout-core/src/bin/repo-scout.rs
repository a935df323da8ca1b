//! Command-line interface for repo-scout.
//!
//! Scans a directory for Git clones and prints them grouped by hosting
//! provider, as a table or as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use repo_scout_core::{
    l10n::Localizer,
    logging::{self, Verbosity},
    startup, Error, IssueKind, ProviderConfig, ProviderRepos, ScanConfig, ScanReport,
};
use serde::Serialize;
use std::path::PathBuf;

/// repo-scout - Find local Git clones and group them by hosting provider
#[derive(Parser, Debug)]
#[command(
    name = "repo-scout",
    version,
    about = "Find local Git clones and group them by hosting provider",
    long_about = None
)]
struct Cli {
    /// Directory to scan (default: from config, else home directory)
    #[arg(short = 'r', long = "root", value_name = "PATH")]
    root: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replace the ignore set (can be specified multiple times)
    #[arg(long = "ignore", value_name = "NAME")]
    ignore: Vec<String>,

    /// Add a directory name to the ignore set (can be specified multiple times)
    #[arg(short = 'i', long = "add-ignore", value_name = "NAME")]
    add_ignore: Vec<String>,

    /// Register a provider as NAME=PATTERN; the pattern needs a `repo` group
    #[arg(short = 'p', long = "provider", value_name = "NAME=PATTERN", value_parser = parse_provider)]
    providers: Vec<ProviderConfig>,

    /// Skip the built-in GitHub, Gitee, Gitcode and CNB providers
    #[arg(long = "no-default-providers")]
    no_default_providers: bool,

    /// Maximum recursion depth (default: unlimited)
    #[arg(short = 'd', long = "depth", value_name = "N")]
    max_depth: Option<usize>,

    /// Descend through symbolic links
    #[arg(long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Output as JSON
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Increase log output (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Locale for messages (e.g., en, de)
    #[arg(short = 'l', long = "locale", value_name = "LOCALE")]
    locale: Option<String>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    repositories: &'a ProviderRepos,
    report: &'a ScanReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(Verbosity::from_flags(cli.verbose, cli.quiet));

    let localizer = match &cli.locale {
        Some(locale) => {
            Localizer::new(locale).with_context(|| format!("Failed to load locale: {}", locale))?
        }
        None => Localizer::from_system()
            .or_else(|_| Localizer::new("en"))
            .context("Failed to load default locale")?,
    };

    let config = build_scan_config(&cli)?;

    if !cli.json {
        let path = config.root.display().to_string();
        eprintln!("{}", localizer.get("scan-started", Some(&[("path", path.as_str())])));
    }

    let (service, handle) = startup(&config).context("Failed to set up discovery")?;
    let handle = handle.context("Startup did not schedule a scan")?;
    let report = handle
        .join()
        .map_err(|_| anyhow::anyhow!("Scan thread panicked"))?
        .context("Scan failed")?;

    let results = service.results();
    if cli.json {
        output_json(&results, &report)?;
    } else {
        output_table(&results, &report, &localizer);
    }

    Ok(())
}

/// Builds a ScanConfig from the config file (if any) and CLI arguments
fn build_scan_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?,
        None => ScanConfig::default(),
    };

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if !config.root.exists() {
        return Err(Error::path_not_found(&config.root).into());
    }
    if !config.root.is_dir() {
        return Err(Error::not_a_directory(&config.root).into());
    }

    if cli.no_default_providers {
        config.default_providers = false;
    }
    config.providers.extend(cli.providers.iter().cloned());
    if !cli.ignore.is_empty() {
        config.ignore = Some(cli.ignore.clone());
    }
    config.extra_ignore.extend(cli.add_ignore.iter().cloned());
    if cli.max_depth.is_some() {
        config.max_depth = cli.max_depth;
    }
    config.follow_symlinks |= cli.follow_symlinks;

    // The CLI exists to scan, whatever the file says
    config.auto_scan = true;

    Ok(config)
}

/// Parses `NAME=PATTERN`
fn parse_provider(value: &str) -> std::result::Result<ProviderConfig, String> {
    let (name, pattern) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATTERN, got '{}'", value))?;
    if name.trim().is_empty() {
        return Err("provider name is empty".to_string());
    }
    Ok(ProviderConfig {
        name: name.trim().to_string(),
        pattern: pattern.to_string(),
    })
}

/// Outputs results and report as JSON to stdout
fn output_json(results: &ProviderRepos, report: &ScanReport) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonOutput {
        repositories: results,
        report,
    })
    .context("Failed to serialize results to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Outputs results grouped by provider, then skipped directories
fn output_table(results: &ProviderRepos, report: &ScanReport, localizer: &Localizer) {
    if report.cancelled {
        println!("{}", localizer.get("scan-cancelled", None));
    }

    if results.total() == 0 {
        println!("{}", localizer.get("scan-no-results", None));
    } else {
        let header_provider = localizer.get("header-provider", None);
        let header_repository = localizer.get("header-repository", None);
        let header_branch = localizer.get("header-branch", None);

        let rows: Vec<(&str, &str, &str)> = results
            .iter()
            .flat_map(|(provider, repos)| {
                repos.iter().map(move |d| {
                    let (slug, branch) = split_descriptor(d);
                    (provider, slug, branch)
                })
            })
            .collect();

        let provider_width = column_width(rows.iter().map(|r| r.0), &header_provider);
        let repo_width = column_width(rows.iter().map(|r| r.1), &header_repository).min(60);

        println!(
            "{:<provider_width$}  {:<repo_width$}  {}",
            header_provider, header_repository, header_branch,
        );
        println!("{}", "=".repeat(provider_width + repo_width + 12));

        for (provider, slug, branch) in &rows {
            println!(
                "{:<provider_width$}  {:<repo_width$}  {}",
                provider,
                truncate(slug, repo_width),
                branch,
            );
        }

        let empty: Vec<&str> = results
            .iter()
            .filter(|(_, repos)| repos.is_empty())
            .map(|(provider, _)| provider)
            .collect();
        for provider in empty {
            println!(
                "{:<provider_width$}  {}",
                provider,
                localizer.get("provider-empty", None)
            );
        }
    }

    if report.unclassified > 0 {
        let count = report.unclassified.to_string();
        println!(
            "{}",
            localizer.get("unclassified-count", Some(&[("count", count.as_str())]))
        );
    }

    if !report.issues.is_empty() {
        println!();
        println!("{}", localizer.get("issues-header", None));
        for issue in &report.issues {
            let path = issue.path.display().to_string();
            let line = match issue.kind {
                IssueKind::Unreadable => localizer.get(
                    "issue-unreadable",
                    Some(&[("path", path.as_str()), ("reason", issue.message.as_str())]),
                ),
                IssueKind::NoRemote => localizer.get("issue-no-remote", Some(&[("path", path.as_str())])),
            };
            println!("  {}", line);
        }
    }

    println!();
    let count = report.classified.to_string();
    let elapsed = report.elapsed_ms.to_string();
    println!(
        "{}",
        localizer.get(
            "scan-complete",
            Some(&[("count", count.as_str()), ("elapsed", elapsed.as_str())])
        )
    );
}

/// Splits `owner/repo:branch` at the last colon
fn split_descriptor(descriptor: &str) -> (&str, &str) {
    descriptor.rsplit_once(':').unwrap_or((descriptor, ""))
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.chars().count())
}

/// Truncates a string to a maximum width, adding "..." if truncated
/// Unicode-safe version that respects character boundaries
fn truncate(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        "...".to_string()
    } else {
        s.chars().take(max_width - 3).collect::<String>() + "..."
    }
}
