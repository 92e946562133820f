//! Catalog store: every language pack found on disk, loaded once at startup.
//!
//! Loading is all-or-nothing. A missing directory or a single malformed file
//! aborts construction, so the bot never serves a partial set of translations.
//! After construction the catalog is read-only and can be shared freely
//! behind an `Arc`.

use crate::i18n::registry::json_stem;
use crate::i18n::{LanguageCode, LanguagePack};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Failure while building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read locale path {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse language file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("language file {} must contain a JSON object at the top level", .path.display())]
    NotAnObject { path: PathBuf },
}

/// A language code with no loaded pack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no language pack loaded for '{0}'")]
    UnknownLanguage(LanguageCode),
}

#[derive(Debug, Default)]
pub struct Catalog {
    packs: HashMap<LanguageCode, Arc<LanguagePack>>,
}

impl Catalog {
    /// Load every `<code>.json` file in `dir`.
    ///
    /// The file stem is used as the language code. Files with another
    /// extension and subdirectories are skipped.
    ///
    /// # Arguments
    /// * `dir` - Directory holding the language files (e.g., "locales")
    ///
    /// # Returns
    /// * `Ok(Catalog)` holding one pack per file found
    /// * `Err(CatalogError::Io)` if the directory or a file cannot be read
    /// * `Err(CatalogError::Parse)` if any file is not valid JSON
    /// * `Err(CatalogError::NotAnObject)` if any file is valid JSON but not an object
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| CatalogError::Io { path, source }
        };

        let mut packs = HashMap::new();
        for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
            let path = entry.map_err(io_err(dir))?.path();
            let Some(code) = json_stem(&path) else {
                continue;
            };

            let pack = read_pack(&path)?;
            packs.insert(LanguageCode::from(code), Arc::new(pack));
        }

        let catalog = Self { packs };
        let codes: Vec<_> = catalog.codes().iter().map(|code| code.as_str()).collect();
        info!("Loaded languages: {}", codes.join(", "));

        Ok(catalog)
    }

    /// Build a catalog from packs already in memory.
    pub fn from_packs<I, C>(packs: I) -> Self
    where
        I: IntoIterator<Item = (C, LanguagePack)>,
        C: Into<LanguageCode>,
    {
        Self {
            packs: packs
                .into_iter()
                .map(|(code, pack)| (code.into(), Arc::new(pack)))
                .collect(),
        }
    }

    /// Pack for `code`.
    ///
    /// # Errors
    /// [`LookupError::UnknownLanguage`] if `code` was never loaded.
    pub fn get_pack(&self, code: &str) -> Result<Arc<LanguagePack>, LookupError> {
        self.packs
            .get(code)
            .cloned()
            .ok_or_else(|| LookupError::UnknownLanguage(LanguageCode::from(code)))
    }

    /// Loaded codes, sorted.
    pub fn codes(&self) -> Vec<&LanguageCode> {
        let mut codes: Vec<_> = self.packs.keys().collect();
        codes.sort();
        codes
    }

    pub fn contains(&self, code: &str) -> bool {
        self.packs.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

fn read_pack(path: &Path) -> Result<LanguagePack, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(entries) => Ok(LanguagePack::new(entries)),
        _ => Err(CatalogError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}
