//! Persistent store interface for per-chat language and blacklist state.

use crate::i18n::LanguageCode;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Where chat language assignments and the blacklist live.
///
/// `get_lang` may perform I/O. `is_blacklisted` must answer from memory and
/// never block on the backing store.
#[async_trait]
pub trait LanguageStore: Send + Sync {
    /// Language code assigned to `chat_id`.
    async fn get_lang(&self, chat_id: i64) -> Result<LanguageCode>;

    /// Whether the bot should refuse to serve `chat_id`.
    fn is_blacklisted(&self, chat_id: i64) -> bool;
}

/// In-memory store, used for tests and for running without a database.
pub struct MemoryStore {
    default_lang: LanguageCode,
    languages: RwLock<HashMap<i64, LanguageCode>>,
    blacklist: RwLock<HashSet<i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_default(LanguageCode::from("en"))
    }

    /// Store answering `default_lang` for chats with no assignment.
    pub fn with_default(default_lang: impl Into<LanguageCode>) -> Self {
        Self {
            default_lang: default_lang.into(),
            languages: RwLock::new(HashMap::new()),
            blacklist: RwLock::new(HashSet::new()),
        }
    }

    pub fn set_lang(&self, chat_id: i64, code: impl Into<LanguageCode>) {
        self.languages
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(chat_id, code.into());
    }

    pub fn blacklist(&self, chat_id: i64) {
        self.blacklist
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(chat_id);
    }

    /// Returns true if the chat was blacklisted.
    pub fn unblacklist(&self, chat_id: i64) -> bool {
        self.blacklist
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&chat_id)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageStore for MemoryStore {
    async fn get_lang(&self, chat_id: i64) -> Result<LanguageCode> {
        let languages = self.languages.read().unwrap_or_else(|e| e.into_inner());
        Ok(languages
            .get(&chat_id)
            .cloned()
            .unwrap_or_else(|| self.default_lang.clone()))
    }

    fn is_blacklisted(&self, chat_id: i64) -> bool {
        self.blacklist
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&chat_id)
    }
}
