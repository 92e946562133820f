//! Internationalization (i18n) module for per-chat language support.
//!
//! # Architecture
//!
//! - `registry`: Static list of every language code the bot recognizes
//! - `language`: `LanguageCode`, the key shared by catalog, registry and store
//! - `pack`: A single language's translations
//! - `catalog`: All packs found on disk, loaded once at startup
//! - `resolver`: Looks up a chat's stored language and returns its pack
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_lang::i18n::{Catalog, Resolver};
//!
//! let catalog = Arc::new(Catalog::load("locales")?);
//! let resolver = Resolver::new(catalog, store);
//! let lang = resolver.resolve(chat_id).await?;
//! ```

mod catalog;
mod language;
mod pack;
mod registry;
mod resolver;

pub use catalog::{Catalog, CatalogError, LookupError};
pub use language::LanguageCode;
pub use pack::LanguagePack;
pub use registry::{LanguageEntry, LanguageRegistry};
pub use resolver::{ResolveError, Resolver};
