//! Language registry: the closed set of language codes the bot recognizes.
//!
//! The registry is declared statically and is independent of which language
//! packs actually exist on disk. It uses a singleton pattern with `OnceLock`
//! so every caller shares the same immutable table.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// A recognized language and its human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    /// Language code, also the base name of its pack file (e.g., "en", "zh-hans")
    pub code: &'static str,

    /// English display name (e.g., "English", "Chinese (Simplified)")
    pub name: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageEntry>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a registry entry by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageEntry> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Display name for a code, if the code is registered.
    pub fn display_name(&self, code: &str) -> Option<&'static str> {
        self.get_by_code(code).map(|lang| lang.name)
    }

    /// Check whether a code is part of the registry.
    pub fn is_known(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// All registered languages, in declaration order.
    pub fn list_all(&self) -> Vec<&LanguageEntry> {
        self.languages.iter().collect()
    }

    /// Languages that are both registered and present as `<code>.json` in `dir`.
    ///
    /// The directory is scanned on every call, so the result reflects the disk
    /// as it is now rather than what was loaded into the catalog at startup.
    /// Files whose stem is not a registered code are skipped.
    ///
    /// # Arguments
    /// * `dir` - Directory holding the `<code>.json` language files
    ///
    /// # Returns
    /// A map from code to display name, ordered by code.
    ///
    /// # Errors
    /// Returns an I/O error if `dir` cannot be read.
    pub fn list_supported(&self, dir: &Path) -> io::Result<BTreeMap<String, &'static str>> {
        let mut supported = BTreeMap::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(code) = json_stem(&path) else {
                continue;
            };

            match self.display_name(code) {
                Some(name) => {
                    supported.insert(code.to_string(), name);
                }
                None => debug!("Ignoring unregistered language file {}", path.display()),
            }
        }

        Ok(supported)
    }
}

/// File stem of a `*.json` file, or `None` for anything else.
pub(crate) fn json_stem(path: &Path) -> Option<&str> {
    if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return None;
    }
    path.file_stem().and_then(|stem| stem.to_str())
}

fn default_languages() -> Vec<LanguageEntry> {
    [
        ("en", "English"),
        ("ar", "Arabic"),
        ("my", "Burmese"),
        ("es", "Spanish"),
        ("ru", "Russian"),
        ("fr", "French"),
        ("de", "German"),
        ("pt", "Portuguese"),
        ("hi", "Hindi"),
        ("ja", "Japanese"),
        ("zh-hans", "Chinese (Simplified)"),
    ]
    .into_iter()
    .map(|(code, name)| LanguageEntry { code, name })
    .collect()
}
