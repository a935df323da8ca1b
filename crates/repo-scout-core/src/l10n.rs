//! Localized CLI messages using Project Fluent.
//!
//! Translations ship inside the binary; a `locales/{locale}/main.ftl` file
//! found on disk takes precedence so translations can be tried out without a
//! rebuild.
//!
//! # Supported Locales
//!
//! - English (en) - Default fallback
//! - German (de)
//!
//! # Example
//!
//! ```
//! use repo_scout_core::l10n::Localizer;
//!
//! let localizer = Localizer::new("en").unwrap();
//! let message = localizer.get("scan-complete", Some(&[("count", "3"), ("elapsed", "12")]));
//! assert_eq!(message, "3 repositories classified in 12 ms.");
//! ```

use crate::error::{Error, Result};
use fluent::{FluentArgs, FluentBundle, FluentResource};
use std::fs;
use std::path::PathBuf;
use unic_langid::LanguageIdentifier;

/// The default locale used when no locale is specified or loading fails.
pub const DEFAULT_LOCALE: &str = "en";

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("de", include_str!("../locales/de/main.ftl")),
];

/// Loaded translations for one locale.
pub struct Localizer {
    bundle: FluentBundle<FluentResource>,
    locale: LanguageIdentifier,
}

impl Localizer {
    /// Creates a Localizer for `locale_str`, falling back to English when
    /// that locale has no translations.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is malformed or the resources do
    /// not parse.
    pub fn new(locale_str: &str) -> Result<Self> {
        let requested: LanguageIdentifier = locale_str
            .parse()
            .map_err(|_| Error::l10n(format!("Invalid locale: {}", locale_str)))?;

        let locale = if find_resource(requested.language.as_str()).is_some() {
            requested
        } else {
            DEFAULT_LOCALE
                .parse()
                .map_err(|_| Error::l10n("Invalid default locale"))?
        };

        let source = find_resource(locale.language.as_str()).ok_or_else(|| {
            Error::l10n(format!("Could not find locale file for '{}'", locale))
        })?;

        let resource = FluentResource::try_new(source)
            .map_err(|(_, errors)| Error::l10n(format!("Failed to parse FTL: {:?}", errors)))?;

        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|e| Error::l10n(format!("Failed to add resource: {:?}", e)))?;

        Ok(Self { bundle, locale })
    }

    /// Creates a Localizer for the locale named by the environment.
    pub fn from_system() -> Result<Self> {
        Self::new(&detect_system_locale())
    }

    /// Formats message `msg_id` with optional arguments.
    ///
    /// Unknown ids come back as `[msg_id]` rather than failing.
    pub fn get(&self, msg_id: &str, args: Option<&[(&str, &str)]>) -> String {
        let Some(pattern) = self.bundle.get_message(msg_id).and_then(|m| m.value()) else {
            return format!("[{}]", msg_id);
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (key, value) in args {
                fluent_args.set(*key, value.to_string());
            }
            fluent_args
        });

        let mut errors = vec![];
        let formatted = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            tracing::debug!(message = msg_id, ?errors, "fluent formatting errors");
        }
        formatted.into_owned()
    }

    /// The locale actually in use.
    pub fn locale(&self) -> String {
        self.locale.to_string()
    }
}

/// Detects the language from `LC_ALL`, `LC_MESSAGES` or `LANG`.
///
/// With `LANG=de_DE.UTF-8`, this function returns `"de"`.
pub fn detect_system_locale() -> String {
    std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LC_MESSAGES"))
        .or_else(|_| std::env::var("LANG"))
        .ok()
        .and_then(|locale| {
            locale
                .split(['_', '.'])
                .next()
                .filter(|lang| !lang.is_empty())
                .map(str::to_lowercase)
        })
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

fn find_resource(language: &str) -> Option<String> {
    let on_disk = [
        PathBuf::from(format!("locales/{}/main.ftl", language)),
        PathBuf::from(format!("crates/repo-scout-core/locales/{}/main.ftl", language)),
    ];

    on_disk
        .iter()
        .find_map(|path| fs::read_to_string(path).ok())
        .or_else(|| {
            EMBEDDED
                .iter()
                .find(|(code, _)| *code == language)
                .map(|(_, source)| source.to_string())
        })
}
