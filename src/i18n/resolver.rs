//! Resolver: chat id → stored language code → loaded pack.

use crate::i18n::{Catalog, LanguagePack, LookupError};
use crate::store::LanguageStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read language for chat {chat_id}")]
    Store {
        chat_id: i64,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Maps a chat to its active language pack.
///
/// There is no default-language fallback here: a stored code with no loaded
/// pack is a configuration defect and is reported as [`ResolveError::Lookup`].
pub struct Resolver<S> {
    catalog: Arc<Catalog>,
    store: Arc<S>,
}

impl<S> Clone for Resolver<S> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LanguageStore> Resolver<S> {
    pub fn new(catalog: Arc<Catalog>, store: Arc<S>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Language pack currently assigned to `chat_id`.
    ///
    /// The store is asked on every call, so a language change takes effect
    /// on the next event from that chat.
    ///
    /// # Arguments
    /// * `chat_id` - Telegram chat id (negative for groups and channels)
    ///
    /// # Returns
    /// * `Ok(pack)` shared with the catalog
    /// * `Err(ResolveError::Store)` if the store lookup fails
    /// * `Err(ResolveError::Lookup)` if the stored code has no loaded pack
    pub async fn resolve(&self, chat_id: i64) -> Result<Arc<LanguagePack>, ResolveError> {
        let code = self
            .store
            .get_lang(chat_id)
            .await
            .map_err(|source| ResolveError::Store { chat_id, source })?;

        debug!("Chat {} uses language {}", chat_id, code);
        Ok(self.catalog.get_pack(code.as_str())?)
    }
}
